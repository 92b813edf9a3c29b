use clap::Parser;
use fourier_synth::spectrum::{bin_frequencies, dominant_frequency, magnitude_spectrum};
use fourier_synth::wav::read_wav;
use plotters::prelude::*;

/// Plot a WAV file's waveform and magnitude spectrum to SVG
#[derive(Parser)]
#[command(name = "plot-track")]
struct Args {
    /// Input WAV file
    input: String,
    /// Output SVG path
    output: String,
    /// Highest frequency shown in the spectrum (Hz)
    #[arg(long, default_value_t = 5000.0)]
    max_freq: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let (samples, sample_rate) = read_wav(&args.input)?;
    if samples.is_empty() {
        return Err(format!("{} has no samples", args.input).into());
    }
    println!(
        "Read {} samples at {} Hz ({:.2}s)",
        samples.len(),
        sample_rate,
        samples.len() as f64 / sample_rate as f64
    );

    let spectrum = magnitude_spectrum(&samples);
    let freqs = bin_frequencies(samples.len(), sample_rate);
    if let Some(f) = dominant_frequency(&samples, sample_rate) {
        println!("  Strongest component: {:.1} Hz", f);
    }

    let root = SVGBackend::new(&args.output, (1000, 700)).into_drawing_area();
    root.fill(&BLACK)?;
    let (upper, lower) = root.split_vertically(350);

    let peak = samples.iter().fold(0.0f64, |m, s| m.max(s.abs())).max(1e-9);
    let mut wave = ChartBuilder::on(&upper)
        .margin(10)
        .caption("Waveform", ("sans-serif", 18).into_font().color(&WHITE))
        .build_cartesian_2d(0usize..samples.len(), -peak..peak)?;
    wave.draw_series(LineSeries::new(
        samples.iter().enumerate().map(|(i, &s)| (i, s)),
        &WHITE,
    ))?;

    let shown: Vec<(f64, f64)> = freqs
        .iter()
        .zip(spectrum.iter())
        .take_while(|(f, _)| **f <= args.max_freq)
        .map(|(&f, &m)| (f, m))
        .collect();
    let max_mag = shown.iter().fold(0.0f64, |m, (_, v)| m.max(*v)).max(1e-9);

    let mut freq_chart = ChartBuilder::on(&lower)
        .margin(10)
        .x_label_area_size(30)
        .caption("Spectrum", ("sans-serif", 18).into_font().color(&WHITE))
        .build_cartesian_2d(0f64..args.max_freq, 0f64..max_mag * 1.05)?;
    freq_chart.configure_mesh()
        .disable_mesh()
        .x_desc("Frequency (Hz)")
        .axis_style(&WHITE)
        .label_style(("sans-serif", 12).into_font().color(&WHITE))
        .draw()?;
    freq_chart.draw_series(LineSeries::new(shown, &CYAN))?;

    root.present()?;
    println!("Output: {}", args.output);
    Ok(())
}
