//! Example demonstrating the voice engine on a generated signal
//!
//! Run with: cargo run --package voxform-core --example shift_demo

use voxform_core::domain::{EngineConfig, ParamId, Preset, VoiceEngine};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("voxform_core=debug,info")
        .init();

    println!("=== Voxform Engine Demo ===\n");

    // 1. Prepare the engine
    println!("1. Preparing engine (48 kHz, 512-frame blocks)...");
    let mut engine = VoiceEngine::new();
    engine.prepare(EngineConfig::new(48_000, 512))?;
    println!("   ✓ Prepared, latency {} samples", engine.latency_samples());

    // 2. Dial in a transformation
    println!("\n2. Setting parameters (+7 semitones, bass enhancement)...");
    let params = engine.params().clone();
    params.set(ParamId::TransposeSemitones, 7.0);
    params.set(ParamId::FormantRatio, 1.15);
    params.set(ParamId::BassMix, 40.0);
    params.set(ParamId::BassDriveDb, 9.0);
    println!("   ✓ Parameters set");

    // 3. Process one second of a 220 Hz tone in 512-frame blocks
    println!("\n3. Processing one second of a 220 Hz tone...");
    let sample_rate = 48_000.0_f32;
    let mut signal: Vec<f32> = (0..48_000)
        .flat_map(|i| {
            let s = 0.25 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sample_rate).sin();
            [s, s]
        })
        .collect();
    for block in signal.chunks_mut(512 * 2) {
        engine.process(block);
    }
    let peak = signal.iter().map(|s| s.abs()).fold(0.0_f32, f32::max);
    println!("   ✓ Processed, output peak {peak:.3}");

    // 4. Save the settings as a preset
    println!("\n4. Saving the settings as a preset...");
    let preset_path = "demo_preset.toml";
    let preset = Preset::from_store("demo", &params);
    preset.save_path(preset_path)?;
    println!("   ✓ Preset saved to {preset_path}");

    // 5. Load it back and re-apply
    println!("\n5. Loading the preset back...");
    let loaded = Preset::load_path(preset_path)?;
    loaded.apply(&params)?;
    println!("   ✓ Preset '{}' re-applied ({} values)", loaded.name, loaded.params.len());

    println!("\n=== Demo Complete ===");

    // Cleanup
    std::fs::remove_file(preset_path)?;

    Ok(())
}
