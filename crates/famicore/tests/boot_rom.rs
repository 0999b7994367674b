//! Whole-console scenarios: boot a synthetic PRG image and observe the
//! machine from the outside.

mod common;

use common::run_program_for_frames;
use ctor::ctor;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[ctor]
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// `LDA #$42 / STA $0200 / JMP *`: after a few frames the store has
/// landed and the CPU is parked on the jump.
#[test]
fn boots_and_runs_a_store_loop() {
    let program = [
        0xA9, 0x42, // LDA #$42
        0x8D, 0x00, 0x02, // STA $0200
        0x4C, 0x05, 0x80, // JMP $8005
    ];
    let console = run_program_for_frames(&program, &[], 3);

    assert_eq!(console.peek_cpu_byte(0x0200), 0x42);
    let snapshot = console.cpu_snapshot();
    assert_eq!(snapshot.a, 0x42);
    assert!(
        (0x8005..=0x8008).contains(&snapshot.pc),
        "pc oscillates at the jump, was {:#06X}",
        snapshot.pc
    );
}

/// A frame is ~29780 CPU cycles (one third of 341x262 dots).
#[test]
fn frame_pacing_matches_the_clock_ratio() {
    let program = [0x4C, 0x00, 0x80]; // JMP $8000
    let mut console = run_program_for_frames(&program, &[], 1);

    let before = console.cycle_count();
    console.run_single_frame();
    let cycles = console.cycle_count() - before;
    assert!(
        (29_700..=29_900).contains(&cycles),
        "frame took {cycles} cycles"
    );
}

/// One frame of audio at 44.1 kHz is ~735 samples; draining rewinds the
/// producer.
#[test]
fn audio_samples_accumulate_per_frame() {
    let program = [0x4C, 0x00, 0x80];
    let mut console = run_program_for_frames(&program, &[], 1);
    let _ = console.sample_buffer();

    console.run_single_frame();
    let samples = console.sample_buffer().len();
    assert!(
        (650..=800).contains(&samples),
        "one frame produced {samples} samples"
    );
    assert!(console.sample_buffer().is_empty());
}

/// Enables the v-blank NMI and counts handler entries in zero page: one
/// per frame.
#[test]
fn vblank_nmi_fires_once_per_frame() {
    let program = [
        0xA9, 0x80, // LDA #$80
        0x8D, 0x00, 0x20, // STA $2000 (enable NMI)
        0x4C, 0x05, 0x80, // JMP $8005
    ];
    let handler = [
        0xE6, 0x10, // INC $10
        0x40, // RTI
    ];
    let vectors = [0x00u8, 0x90]; // NMI -> $9000

    let console = run_program_for_frames(&program, &[(0x9000, &handler), (0xFFFA, &vectors)], 4);

    let nmi_count = console.peek_cpu_byte(0x10);
    assert!(
        (3..=4).contains(&nmi_count),
        "nmi handler ran {nmi_count} times over 4 frames"
    );
}

/// The frame buffer exposes 256x240 palette indices and stays in range.
#[test]
fn frame_buffer_has_the_right_shape() {
    let program = [0x4C, 0x00, 0x80];
    let console = run_program_for_frames(&program, &[], 2);

    let frame = console.frame_buffer();
    assert_eq!(frame.len(), famicore::SCREEN_WIDTH * famicore::SCREEN_HEIGHT);
}
