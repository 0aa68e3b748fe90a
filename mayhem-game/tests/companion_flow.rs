use anyhow::Result;
use mayhem_game::constants::{KEY_CURRENT_ROUND, KEY_NEEDED_SUPPLY, MAX_ROUNDS};
use mayhem_game::{
    Allocation, Companion, MemoryStore, SilentPlayer, StartOutcome, TickOutcome, TileAllocator,
};

fn load(store: MemoryStore, seed: u64) -> Result<Companion<MemoryStore>> {
    Ok(Companion::load(
        store,
        SilentPlayer,
        TileAllocator::default(),
        seed,
    )?)
}

fn run_round(companion: &mut Companion<MemoryStore>) -> Result<TickOutcome> {
    loop {
        match companion.tick()? {
            TickOutcome::Counting { .. } => {}
            other => return Ok(other),
        }
    }
}

#[test]
fn full_game_of_ten_days() -> Result<()> {
    let mut companion = load(MemoryStore::new(), 77)?;
    assert!(companion.timer().setup_open);

    let mut survivors = 5;
    for day in 1..=MAX_ROUNDS {
        if day > 1 {
            assert_eq!(companion.start()?, StartOutcome::SetupRequired);
        }
        let allocation = companion.calculate(survivors)?;
        assert_eq!(allocation.is_board(), day == 1);
        companion.proceed()?;
        assert_eq!(companion.timer().round, day);

        let outcome = run_round(&mut companion)?;
        if day < MAX_ROUNDS {
            let TickOutcome::RoundOver { next_round, needed } = outcome else {
                panic!("day {day} should end with a needed supply");
            };
            assert_eq!(next_round, day + 1);
            assert_eq!(companion.timer().announced_supply(), Some(needed));
            assert!(companion.store().values().contains_key(KEY_NEEDED_SUPPLY));
        } else {
            assert_eq!(outcome, TickOutcome::GameOver);
        }
        if day % 3 == 0 && survivors > 2 {
            survivors -= 1;
        }
    }

    assert!(companion.timer().is_game_over());
    assert_eq!(companion.start()?, StartOutcome::GameOver);
    Ok(())
}

#[test]
fn paused_round_survives_a_reload() -> Result<()> {
    let mut companion = load(MemoryStore::new(), 3)?;
    let Allocation::Board(_) = companion.calculate(4)? else {
        panic!("first day lays out a board");
    };
    companion.proceed()?;
    for _ in 0..20 {
        companion.tick()?;
    }
    companion.pause()?;
    let time_left = companion.timer().time_left;

    let store = companion.into_store();
    assert_eq!(
        store.values().get(KEY_CURRENT_ROUND).map(String::as_str),
        Some("1")
    );
    let mut restored = load(store, 4)?;
    assert_eq!(restored.timer().time_left, time_left);
    assert!(!restored.timer().setup_open);
    assert!(!restored.session().is_first_day);
    assert_eq!(restored.session().previous_player_count, 4);
    assert_eq!(restored.start()?, StartOutcome::Resumed);
    assert!(restored.timer().active);
    Ok(())
}

#[test]
fn reload_between_days_reopens_setup_and_decays() -> Result<()> {
    let mut companion = load(MemoryStore::new(), 8)?;
    companion.calculate(3)?;
    companion.proceed()?;
    run_round(&mut companion)?;
    companion.start()?;

    let mut restored = load(companion.into_store(), 9)?;
    assert!(restored.timer().setup_open);
    let allocation = restored.calculate(3)?;
    assert!(!allocation.is_board());
    assert!(restored.calculate(4).is_err());
    Ok(())
}
