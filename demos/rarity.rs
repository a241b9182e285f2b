use exactdraw::{DropTable, FlatTree, WeightedEnum, with_thread_flipper};
use std::collections::HashMap;

#[derive(Copy, Eq, PartialEq, Clone, Debug, Hash, WeightedEnum)]
enum Rarity {
    #[weight(1)]
    Mythic,
    #[weight(10)]
    Legendary,
    #[weight(200)]
    Uncommon,
    #[weight(789)]
    Common,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build straight from the enum (alias table):
    let table = Rarity::droptable()?;
    // Or pick a tree sampler instead:
    let tree = Rarity::droptable_with::<FlatTree>()?;
    let mut hist: HashMap<Rarity, u64> = HashMap::default();

    // Or, if you want to mix arbitrary items with weights:
    let custom: DropTable<&'static str> = DropTable::from_pairs([("sword", 1u32), ("shield", 3)])?;

    let draws = 1_000_000;
    let bits_used = with_thread_flipper(|bits| {
        let start = bits.bits_consumed();
        for _ in 0..draws {
            *hist.entry(table.sample_owned(bits)).or_default() += 1;
            *hist.entry(tree.sample_owned(bits)).or_default() += 1;
        }
        println!("custom drop: {}", custom.sample(bits));
        bits.bits_consumed() - start
    });

    let mut v: Vec<_> = hist.into_iter().collect();
    v.sort_by(|a, b| b.1.cmp(&a.1));
    for (k, c) in v {
        println!("{c:>8} {k:?}");
    }
    println!(
        "bits per draw: {:.3}",
        bits_used as f64 / (2 * draws) as f64
    );
    Ok(())
}
