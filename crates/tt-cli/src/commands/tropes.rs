use colored::Colorize;

use tt_tropes::{Implementation, TropeTable};

pub fn run(count: usize, rate: f64, seed: Option<u64>) -> Result<(), String> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(format!("subversion rate must be between 0 and 1, got {rate}"));
    }

    let table = TropeTable::noir();
    let mut rng = super::rng_from(seed);
    let picks = table.generate(rate, count, &mut rng);

    println!(
        "  {} ({:.0}% subversion rate)",
        "Noir story elements".bold(),
        rate * 100.0
    );
    println!();

    for (i, pick) in picks.iter().enumerate() {
        let kind = match pick.implementation {
            Implementation::Convention => pick.implementation.to_string().cyan(),
            Implementation::Subversion => pick.implementation.to_string().magenta(),
        };
        println!("{}. {}", i + 1, pick.title.bold());
        println!("   Type: {kind}");
        println!("   Implementation: {}", pick.text);
        println!();
    }

    let subverted = picks
        .iter()
        .filter(|p| p.implementation == Implementation::Subversion)
        .count();
    println!(
        "  Summary: {} conventional, {subverted} subverted",
        picks.len() - subverted
    );
    Ok(())
}
