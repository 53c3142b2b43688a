//! Basic demonstration of the Signal Kip Void Simulator.
//!
//! Run with: cargo run --example basic_demo

use kip_sim::{Aquarium, AquariumConfig};

fn main() {
    println!("=== Signal Kip Void Simulator - Demo ===\n");

    let mut aquarium = Aquarium::with_config(AquariumConfig {
        seed: Some(42),
        ..Default::default()
    });
    aquarium.start();

    println!("Initial state:");
    print_snapshot(&mut aquarium);

    // Sweep the pointer across the tank to scare the school
    println!("\n--- Sweeping pointer through the school ---\n");
    let mut now = 0.0f64;
    for tick in 0..600 {
        now += 16.67;
        aquarium.set_pointer((tick % 800) as f32, 300.0);

        // Drop food around the 3 second mark (double action)
        if tick == 180 {
            aquarium.primary_action(400.0, 100.0, now);
            aquarium.primary_action(400.0, 100.0, now + 80.0);
        }

        aquarium.tick(now);

        if (tick + 1) % 120 == 0 {
            let frame = aquarium.snapshot();
            println!(
                "--- Tick {} (t={:.1}s) ---",
                frame.tick,
                frame.time_ms / 1000.0
            );
            print_snapshot(&mut aquarium);
        }
    }

    // Try a capture on the first threat fish, if one has emerged
    let target = aquarium
        .snapshot()
        .fish
        .iter()
        .find(|f| f.state == "Hungry" || f.state == "Predator")
        .map(|f| (f.x, f.y));
    if let Some((x, y)) = target {
        println!("\n--- Attempting capture at ({x:.0}, {y:.0}) ---\n");
        aquarium.primary_action(x, y, now + 1000.0);
        now += 16.67;
        aquarium.tick(now);
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", aquarium.snapshot().to_json_pretty().unwrap());
}

fn print_snapshot(aquarium: &mut Aquarium) {
    let frame = aquarium.snapshot();

    println!(
        "  score={} eaten={} food={} particles={}",
        frame.score,
        frame.fish_eaten,
        frame.food.len(),
        frame.particles.len()
    );
    for fish in &frame.fish {
        println!(
            "    Fish {}: pos=({:.1}, {:.1}) size={:.1} glow={:.2} [{}]",
            fish.id, fish.x, fish.y, fish.size, fish.glow, fish.state
        );
    }
}
