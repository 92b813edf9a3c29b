use clap::Parser;
use fourier_synth::generator::{Adsr, Envelope, EnvelopePhase};
use plotters::prelude::*;
use tracing::warn;

const PLOT_RATE: f64 = 1000.0; // 1ms = 1 sample
const DISCONTINUITY_THRESHOLD: f64 = 0.15;

/// Plot an ADSR envelope to SVG
#[derive(Parser)]
#[command(name = "plot-envelope")]
struct Args {
    /// Attack in seconds
    attack: f64,
    /// Decay in seconds
    decay: f64,
    /// Sustain level (0-1)
    sustain_level: f64,
    /// Release in seconds
    release: f64,
    /// Note duration in seconds (release starts here)
    duration: f64,
    /// Output SVG path
    output: String,
}

fn sample_envelope(envelope: &Envelope) -> (Vec<f64>, Vec<EnvelopePhase>) {
    let len = (envelope.total_span() * PLOT_RATE).ceil() as usize + 1;
    (0..len)
        .map(|k| {
            let t = k as f64 / PLOT_RATE;
            (envelope.gain(t), envelope.phase(t))
        })
        .unzip()
}

/// Report the largest step between neighbouring points
///
/// Zero-length attack or release windows jump by design, so a large step
/// is reported rather than treated as a failure.
fn check_discontinuities(samples: &[f64]) {
    let mut max_diff: f64 = 0.0;
    let mut max_diff_idx: usize = 0;

    for i in 1..samples.len() {
        let diff = (samples[i] - samples[i - 1]).abs();
        if diff > max_diff {
            max_diff = diff;
            max_diff_idx = i;
        }
    }

    if max_diff > DISCONTINUITY_THRESHOLD {
        warn!(
            at_ms = max_diff_idx,
            from = samples[max_diff_idx - 1],
            to = samples[max_diff_idx],
            "envelope discontinuity"
        );
        return;
    }

    println!(
        "  ✓ Max step: {:.6} at {}ms (below threshold {})",
        max_diff, max_diff_idx, DISCONTINUITY_THRESHOLD
    );
}

fn create_plot(
    args: &Args,
    samples: &[f64],
    phases: &[EnvelopePhase],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(&args.output, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_time = samples.len().saturating_sub(1) as f64;
    let title = format!(
        "ADSR: A={}s, D={}s, S={:.2}, R={}s, duration={}s",
        args.attack, args.decay, args.sustain_level, args.release, args.duration
    );
    let y_max = args.sustain_level.max(1.0) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..max_time.max(1.0), 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time (ms)")
        .y_desc("Gain")
        .x_labels(10)
        .y_labels(10)
        .draw()?;

    chart.draw_series(LineSeries::new(
        samples.iter().enumerate().map(|(i, &s)| (i as f64, s)),
        BLUE.stroke_width(2),
    ))?;

    // Mark each window transition
    for i in 1..phases.len() {
        if phases[i] != phases[i - 1] {
            chart.draw_series(std::iter::once(plotters::element::Cross::new(
                (i as f64, samples[i]),
                8,
                BLACK.filled(),
            )))?;
        }
    }

    // Note end, where the release starts
    chart.draw_series(std::iter::once(plotters::element::Circle::new(
        (args.duration * PLOT_RATE, args.sustain_level),
        5,
        RED.filled(),
    )))?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    println!("Envelope Plot Generator");
    println!("=======================");
    println!("  Attack: {}s", args.attack);
    println!("  Decay: {}s", args.decay);
    println!("  Sustain: {:.2}", args.sustain_level);
    println!("  Release: {}s", args.release);
    println!("  Duration: {}s", args.duration);
    println!();

    let envelope = Envelope::new(
        Adsr::new(args.attack, args.decay, args.sustain_level, args.release)
            .with_duration(args.duration),
    )?;

    print!("  Sampling envelope... ");
    let (samples, phases) = sample_envelope(&envelope);
    println!("done ({} points, {:.3}s)", samples.len(), envelope.total_span());

    check_discontinuities(&samples);

    print!("  Creating plot... ");
    create_plot(&args, &samples, &phases)?;
    println!("done");

    println!();
    println!("Output: {}", args.output);

    Ok(())
}
