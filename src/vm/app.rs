use std::path::Path;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use rand::Rng;

use crate::vm::config::{HostConfig, KEY_COUNT, SCREEN_WIDTH};
use crate::vm::cpu::step;
use crate::vm::error::Chip8Error;
use crate::vm::state::{create_state, load_rom_file, sound_active, take_frame, VmState};
use crate::vm::timer::{advance_timers, TimerClock, TIMER_TICK};
use crate::vm::tone::beep_wav;

const MAX_FRAME_TIME: Duration = Duration::from_millis(100);

/// Runs `cycles_per_frame` engine cycles against one key snapshot.
pub fn run_frame<R: Rng + ?Sized>(
    state: &mut VmState,
    keys: &[bool; KEY_COUNT],
    cycles_per_frame: usize,
    rng: &mut R,
) -> Result<(), Chip8Error> {
    for _ in 0..cycles_per_frame {
        step(state, keys, rng)?;
    }
    Ok(())
}

/// Frame loop without a window or keyboard. Every frame advances the timers by one tick.
pub fn run_emulator_headless(
    rom_path: &Path,
    frames: usize,
    cycles_per_frame: usize,
) -> Result<VmState, Chip8Error> {
    if frames == 0 {
        return Err(Chip8Error::InvalidArgument("frames must be > 0"));
    }
    if cycles_per_frame == 0 {
        return Err(Chip8Error::InvalidArgument("cycles_per_frame must be > 0"));
    }

    let mut state = create_state();
    load_rom_file(&mut state, rom_path)?;

    let mut rng = rand::thread_rng();
    let mut clock = TimerClock::new();
    let keys = [false; KEY_COUNT];

    for _ in 0..frames {
        if let Err(fault) = run_frame(&mut state, &keys, cycles_per_frame, &mut rng) {
            error!("halting: {fault}");
            return Err(fault);
        }
        advance_timers(&mut state, &mut clock, TIMER_TICK);
    }

    Ok(state)
}

pub fn run_emulator_app(rom_path: &Path, config: HostConfig) -> Result<VmState, Chip8Error> {
    use raylib::prelude::{Color, KeyboardKey, RaylibAudio, RaylibDraw};

    let mut state = create_state();
    load_rom_file(&mut state, rom_path)?;

    let (width, height) = config.window_size()?;
    let (mut rl, thread) = raylib::init()
        .size(width, height)
        .title("chip8-vm")
        .build();
    rl.set_target_fps(config.target_fps as u32);

    let audio = RaylibAudio::init_audio_device().ok();
    if audio.is_none() {
        warn!("no audio device, running without sound");
    }
    let wav = beep_wav();
    let beep = audio.as_ref().and_then(|audio| {
        let wave = audio.new_wave_from_memory(".wav", &wav).ok()?;
        audio.new_sound_from_wave(&wave).ok()
    });

    let key_map = [
        (KeyboardKey::KEY_X, 0x0usize),
        (KeyboardKey::KEY_ONE, 0x1),
        (KeyboardKey::KEY_TWO, 0x2),
        (KeyboardKey::KEY_THREE, 0x3),
        (KeyboardKey::KEY_Q, 0x4),
        (KeyboardKey::KEY_W, 0x5),
        (KeyboardKey::KEY_E, 0x6),
        (KeyboardKey::KEY_A, 0x7),
        (KeyboardKey::KEY_S, 0x8),
        (KeyboardKey::KEY_D, 0x9),
        (KeyboardKey::KEY_Z, 0xA),
        (KeyboardKey::KEY_C, 0xB),
        (KeyboardKey::KEY_FOUR, 0xC),
        (KeyboardKey::KEY_R, 0xD),
        (KeyboardKey::KEY_F, 0xE),
        (KeyboardKey::KEY_V, 0xF),
    ];

    info!(
        "running {} at {} cycles per frame",
        rom_path.display(),
        config.cycles_per_frame
    );

    let mut rng = rand::thread_rng();
    let mut clock = TimerClock::new();
    let mut front_buffer = state.screen_buffer;
    let mut previous_tick = Instant::now();

    while !rl.window_should_close() {
        if rl.is_key_pressed(KeyboardKey::KEY_ESCAPE) {
            break;
        }

        let mut keys = [false; KEY_COUNT];
        for (key, mapped) in key_map {
            keys[mapped] = rl.is_key_down(key);
        }

        if let Err(fault) = run_frame(&mut state, &keys, config.cycles_per_frame, &mut rng) {
            error!("halting: {fault}");
            return Err(fault);
        }

        let now = Instant::now();
        advance_timers(
            &mut state,
            &mut clock,
            (now - previous_tick).min(MAX_FRAME_TIME),
        );
        previous_tick = now;

        if let Some(beep) = &beep {
            if sound_active(&state) {
                if !beep.is_playing() {
                    beep.play();
                }
            } else if beep.is_playing() {
                beep.stop();
            }
        }

        if let Some(frame) = take_frame(&mut state) {
            front_buffer = *frame;
        }

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::BLACK);
        for (index, value) in front_buffer.iter().enumerate() {
            if *value == 0 {
                continue;
            }
            let x = (index % SCREEN_WIDTH) as i32;
            let y = (index / SCREEN_WIDTH) as i32;
            d.draw_rectangle(
                x * config.scale as i32,
                y * config.scale as i32,
                config.scale as i32,
                config.scale as i32,
                Color::WHITE,
            );
        }
    }

    info!("window closed");
    Ok(state)
}
