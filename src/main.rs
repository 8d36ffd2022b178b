//! Plinko Decider entry point
//!
//! The browser build is driven from JavaScript through `plinko_decider::web`.
//! Natively this runs a headless drop and prints the decision.
//!
//! Usage: `plinko-decider [settings.json] [slot-count]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use plinko_decider::audio::SilentAudio;
    use plinko_decider::board::{BoardEvent, Direction, ReleaseOutcome};
    use plinko_decider::physics::World;
    use plinko_decider::{BoardController, Settings, board_dimensions};

    /// Give up after a minute of simulated time
    const MAX_TICKS: u32 = 60 * 60;

    env_logger::init();
    log::info!("Plinko Decider (native) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Settings::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(settings) => {
                log::info!("Loaded settings from {path}");
                settings
            }
            Err(err) => {
                log::warn!("Ignoring settings file {path}: {err}");
                Settings::default()
            }
        },
        None => Settings::default(),
    };
    let slot_count = args.next().and_then(|s| s.parse().ok()).unwrap_or(6);

    let (width, height) = board_dimensions(f32::INFINITY);
    let config = settings.board_config(width, height, slot_count);
    let mut audio = SilentAudio::new();
    audio.volume = settings.volume();
    let mut board =
        match BoardController::new(World::new(config.gravity), audio, config, settings.seed) {
            Ok(board) => board,
            Err(err) => {
                eprintln!("Cannot build board: {err}");
                std::process::exit(1);
            }
        };
    board.attach();

    // Step off the centre peg so the ball cannot balance on it
    let side = if settings.seed % 2 == 0 {
        Direction::Left
    } else {
        Direction::Right
    };
    board.nudge(side);
    if let ReleaseOutcome::Dropped(id) = board.release() {
        log::info!("Dropped ball {}", id.0);
    }

    for tick in 0..MAX_TICKS {
        for event in board.tick() {
            if let BoardEvent::Win(record) = event {
                let label = board
                    .labels()
                    .label_for(record.slot_index)
                    .unwrap_or("(unlabelled)");
                println!(
                    "Slot {} after {:.1}s: {}",
                    record.slot_index,
                    record.timestamp / 1000.0,
                    label
                );
                log::info!("Finished after {} ticks, {} knocks", tick + 1, board.audio_mut().played());
                return;
            }
        }
    }
    println!("The ball never settled into a slot, ask again");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}
