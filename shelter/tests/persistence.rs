use std::{fs, time::Duration};

use minigames_core::CellCoord;
use minigames_shelter::{
    grid::TileKind,
    save::{self, FileStore, KeyValueStore, MemoryStore, SaveData, AUTO_SLOT},
    Shelter, ShelterConfig,
};

fn worked_shelter() -> Shelter {
    let mut shelter = Shelter::new(ShelterConfig::with_seed(5));
    let mut events = Vec::new();
    assert!(shelter.order_dig(CellCoord::new(2, 3), &mut events));
    for _ in 0..40 {
        shelter.update(Duration::from_millis(100), &mut events);
    }
    assert_eq!(
        shelter.grid().tile(CellCoord::new(2, 3)),
        Some(TileKind::Empty)
    );
    shelter
}

#[test]
fn file_store_round_trip_restores_day_dwellers_and_tiles() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = FileStore::new(dir.path().join("saves"));
    assert_eq!(store.root(), dir.path().join("saves"));
    let original = worked_shelter();
    original.save(&mut store, "1").expect("save");

    assert!(dir.path().join("saves/shelter_war_save_1.json").exists());
    assert!(dir.path().join("saves/shelter_war_save_auto.json").exists());

    let mut restored = Shelter::new(ShelterConfig::with_seed(99));
    assert!(restored.load(&store, "1").expect("load"));
    assert_eq!(restored.snapshot(), original.snapshot());
    assert_eq!(restored.grid(), original.grid());
    assert_eq!(restored.workforce().dweller_count(), 2);

    let mut from_auto = Shelter::new(ShelterConfig::with_seed(3));
    assert!(from_auto.load(&store, AUTO_SLOT).expect("load"));
    assert_eq!(from_auto.snapshot(), original.snapshot());
}

#[test]
fn missing_and_malformed_saves_are_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());
    fs::write(dir.path().join("shelter_war_save_2.json"), "{ not json").expect("write");

    let mut shelter = Shelter::new(ShelterConfig::default());
    let before = shelter.snapshot();
    assert!(!shelter.load(&store, "1").expect("load"));
    assert!(!shelter.load(&store, "2").expect("load"));
    assert_eq!(shelter.snapshot(), before);
    assert!(save::has_save(&store, "2").expect("has_save"));
}

#[test]
fn restore_drops_robots_queued_jobs_and_rooms() {
    let mut shelter = worked_shelter();
    let data = shelter.snapshot();

    let mut events = Vec::new();
    let _ = shelter.spawn_robot(&mut events);
    assert!(shelter.order_dig(CellCoord::new(2, 4), &mut events));
    shelter.restore(&data).expect("restore");

    assert_eq!(shelter.workforce().robot_count(), 0);
    assert_eq!(shelter.workforce().jobs().count(), 0);
    assert!(shelter.rooms().rooms().is_empty());
    assert_eq!(shelter.snapshot(), data);
}

#[test]
fn restore_abandons_a_wave_in_progress() {
    let mut shelter = Shelter::new(ShelterConfig::default());
    let data = shelter.snapshot();
    let mut events = Vec::new();
    assert!(shelter.start_war(&mut events));
    for _ in 0..40 {
        shelter.update(Duration::from_millis(100), &mut events);
    }
    assert!(!shelter.waves().hostiles().is_empty());

    shelter.restore(&data).expect("restore");
    assert!(!shelter.waves().is_active());
    assert!(shelter.waves().hostiles().is_empty());
    assert_eq!(shelter.waves().remaining(), 0);
    assert!(!shelter.clock().is_at_war());
    assert!(shelter.start_war(&mut events));
}

#[test]
fn ragged_matrix_is_rejected_on_restore() {
    let mut shelter = Shelter::new(ShelterConfig::default());
    let data = SaveData {
        day: 4,
        workers: Vec::new(),
        tiles: vec![vec![TileKind::Dirt; 3], vec![TileKind::Dirt; 2]],
    };
    assert!(shelter.restore(&data).is_err());
    assert_eq!(shelter.clock().day(), 1);
}

#[test]
fn memory_store_keeps_the_prefixed_key() {
    let mut store = MemoryStore::new();
    let shelter = Shelter::new(ShelterConfig::default());
    shelter.save(&mut store, AUTO_SLOT).expect("save");
    let raw = store
        .read("shelter_war_save_auto")
        .expect("read")
        .expect("entry");
    let decoded: SaveData = serde_json::from_str(&raw).expect("decode");
    assert_eq!(decoded.day, 1);
    assert_eq!(decoded.workers.len(), 2);
}
