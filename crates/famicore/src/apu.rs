//! Audio processing unit.
//!
//! Stepped once per CPU cycle: the frame sequencer and triangle run at the
//! full CPU rate, the pulse channels on every second cycle. Channel outputs
//! go through the non-linear mixer, a high-pass/low-pass filter chain at
//! ~88.2 kHz and a 2:1 decimator into a ring of 44.1 kHz `f32` samples the
//! host drains between frames.

mod dsp;
mod envelope;
mod frame_counter;
mod length_counter;
mod pulse;
mod sweep;
mod triangle;

use crate::apu::dsp::{AntialiasFilter, HighPassFilter};
use crate::apu::frame_counter::FrameCounter;
use crate::apu::pulse::Pulse;
use crate::apu::triangle::Triangle;
use crate::memory::apu as apu_mem;

/// CPU (and therefore APU input) clock rate, NTSC.
pub const CPU_CLOCK_HZ: u32 = 1_789_773;
/// Nominal host-facing sample rate.
pub const OUTPUT_SAMPLE_RATE: u32 = 44_100;

/// CPU cycles between intermediate (pre-decimation) samples; the mixer is
/// tapped at twice the output rate and decimated by two.
const CYCLES_PER_INTERMEDIATE_SAMPLE: u32 = CPU_CLOCK_HZ / (OUTPUT_SAMPLE_RATE * 2);

/// High-pass cutoff frequency in Hz.
const HIGH_PASS_CUTOFF_HZ: u32 = 37;

/// One second of output samples; the host is expected to drain well before
/// the write index wraps.
const SAMPLE_RING_LEN: usize = OUTPUT_SAMPLE_RATE as usize;

/// Non-linear channel mixer.
///
/// The constants are the classic DAC approximation; both groups collapse to
/// zero when all their inputs are silent.
fn mix(pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) -> f32 {
    let pulse_sum = f64::from(pulse1) + f64::from(pulse2);
    let pulse_out = if pulse_sum == 0.0 {
        0.0
    } else {
        95.88 / (8128.0 / pulse_sum + 100.0)
    };

    let tnd_sum =
        f64::from(triangle) / 8227.0 + f64::from(noise) / 12241.0 + f64::from(dmc) / 22638.0;
    let tnd_out = if tnd_sum == 0.0 {
        0.0
    } else {
        159.79 / (1.0 / tnd_sum + 100.0)
    };

    (pulse_out + tnd_out) as f32
}

/// APU state machine.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Apu {
    frame_counter: FrameCounter,
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,

    sample_divider: u32,
    emit_sample: bool,
    high_pass: HighPassFilter,
    low_pass: AntialiasFilter,
    sample_ring: Vec<f32>,
    write_index: usize,
}

impl Apu {
    pub(crate) fn new() -> Self {
        Self {
            frame_counter: FrameCounter::default(),
            pulse1: Pulse::default(),
            pulse2: Pulse::default(),
            triangle: Triangle::default(),
            sample_divider: 0,
            emit_sample: false,
            high_pass: HighPassFilter::new(OUTPUT_SAMPLE_RATE, HIGH_PASS_CUTOFF_HZ),
            low_pass: AntialiasFilter::default(),
            sample_ring: vec![0.0; SAMPLE_RING_LEN],
            write_index: 0,
        }
    }

    /// CPU read of the APU register window. Only the status register has
    /// readable contents.
    pub(crate) fn read(&mut self, addr: u16) -> u8 {
        if addr != apu_mem::STATUS {
            return 0;
        }

        let frame_interrupt = self.frame_counter.frame_interrupt();
        self.frame_counter.clear_frame_interrupt();

        // Bit 3 (noise) and bit 7 (DMC IRQ) read 0: those units are absent.
        u8::from(self.pulse1.length_active())
            | (u8::from(self.pulse2.length_active()) << 1)
            | (u8::from(self.triangle.length_active()) << 2)
            | (u8::from(frame_interrupt) << 6)
    }

    /// CPU write into the APU register window.
    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        let offset = addr - apu_mem::REGISTER_BASE;
        match offset {
            0x00..=0x03 => self.pulse1.write((offset % 4) as u8, value),
            0x04..=0x07 => self.pulse2.write((offset % 4) as u8, value),
            0x08..=0x0B => self.triangle.write((offset % 4) as u8, value),
            0x0C..=0x0F => {} // noise, absent
            0x10..=0x13 => {} // DMC, absent
            0x15 => {
                if value & 0x01 != 0 {
                    self.pulse1.enable();
                } else {
                    self.pulse1.disable();
                }
                if value & 0x02 != 0 {
                    self.pulse2.enable();
                } else {
                    self.pulse2.disable();
                }
                if value & 0x04 != 0 {
                    self.triangle.enable();
                } else {
                    self.triangle.disable();
                }
            }
            0x17 => self.frame_counter.write(value),
            _ => {}
        }
    }

    /// Level of the IRQ line toward the CPU.
    pub(crate) fn irq(&self) -> bool {
        self.frame_counter.frame_interrupt()
    }

    /// Advances the APU by one CPU cycle.
    pub(crate) fn step(&mut self) {
        self.frame_counter.step();
        self.triangle.step();

        if self.frame_counter.apu_clock() {
            self.pulse1.step();
            self.pulse2.step();
        }

        if self.frame_counter.quarter_frame_clock() {
            self.pulse1.quarter_frame_step();
            self.pulse2.quarter_frame_step();
            self.triangle.quarter_frame_step();
        }

        if self.frame_counter.half_frame_clock() {
            self.pulse1.half_frame_step();
            self.pulse2.half_frame_step();
            self.triangle.half_frame_step();
        }

        self.produce_sample();
    }

    fn produce_sample(&mut self) {
        self.sample_divider += 1;
        if self.sample_divider <= CYCLES_PER_INTERMEDIATE_SAMPLE {
            return;
        }
        self.sample_divider = 0;

        let mixed = mix(
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            0,
            0,
        );
        self.low_pass.push(self.high_pass.process(mixed));

        // 2x oversampling: keep every second filtered sample.
        if self.emit_sample {
            self.sample_ring[self.write_index] = self.low_pass.output();
            self.write_index += 1;
            if self.write_index == self.sample_ring.len() {
                self.write_index = 0;
            }
        }
        self.emit_sample = !self.emit_sample;
    }

    /// Samples produced since the last call; rewinds the write position.
    pub(crate) fn drain_samples(&mut self) -> &[f32] {
        let len = self.write_index;
        self.write_index = 0;
        &self.sample_ring[..len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixer_matches_the_closed_form() {
        let output = mix(15, 0, 0, 0, 0);
        let expected = 95.88 / (8128.0 / 15.0 + 100.0);
        assert!((f64::from(output) - expected).abs() < 1e-6);
        assert!(output > 0.0);

        assert_eq!(mix(0, 0, 0, 0, 0), 0.0);
    }

    #[test]
    fn mixer_includes_the_triangle_group() {
        let output = mix(0, 0, 15, 0, 0);
        let expected = 159.79 / (1.0 / (15.0 / 8227.0) + 100.0);
        assert!((f64::from(output) - expected).abs() < 1e-6);
    }

    #[test]
    fn status_read_reports_lengths_and_clears_frame_irq() {
        let mut apu = Apu::new();
        apu.write(0x4015, 0x07); // enable all three channels
        apu.write(0x4003, 0x08); // pulse 1 note on
        apu.write(0x400B, 0x08); // triangle note on

        let status = apu.read(0x4015);
        assert_eq!(status & 0x07, 0b101);

        // Latch a frame IRQ and confirm read-clear behavior.
        for _ in 0..29_828 {
            apu.step();
        }
        assert!(apu.irq());
        let status = apu.read(0x4015);
        assert_ne!(status & 0x40, 0);
        assert!(!apu.irq());
        assert_eq!(apu.read(0x4015) & 0x40, 0);
    }

    #[test]
    fn disabling_a_channel_zeroes_its_length() {
        let mut apu = Apu::new();
        apu.write(0x4015, 0x01);
        apu.write(0x4003, 0x08);
        assert_eq!(apu.read(0x4015) & 0x01, 1);

        apu.write(0x4015, 0x00);
        assert_eq!(apu.read(0x4015) & 0x01, 0);
    }

    #[test]
    fn produces_samples_at_the_output_rate() {
        let mut apu = Apu::new();
        // One four-step sequencer period is ~1/60 s.
        for _ in 0..29_830 {
            apu.step();
        }
        let samples = apu.drain_samples().len();
        // 29830 cycles / 21 per intermediate sample / 2 for decimation.
        assert!((690..=720).contains(&samples), "got {samples} samples");
        assert!(apu.drain_samples().is_empty(), "drain rewinds the buffer");
    }

    #[test]
    fn frame_counter_write_routes_through_4017() {
        let mut apu = Apu::new();
        for _ in 0..29_828 {
            apu.step();
        }
        assert!(apu.irq());
        apu.write(0x4017, 0x00);
        assert!(!apu.irq(), "frame counter write clears the latched IRQ");
    }
}
