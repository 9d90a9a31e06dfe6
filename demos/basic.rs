use hashsize::{shared, ArcHasher, HashCode, HashError, HashSize, Hasher, HasherExt, StandardHasher};

fn main() -> Result<(), HashError> {
    // A stable 64-bit hasher for strings
    let hasher: ArcHasher<str> = shared(StandardHasher::new());

    // Fold every hash into one of 1000 buckets
    let buckets = hasher.sized(&HashSize::from_u32(1000)?);
    println!("Bucket for 'pear tree': {}", buckets.long_hash_value("pear tree")?);

    // Four bit positions for a bloom filter of 2^20 bits, by double hashing
    let bits = hasher.ints().sized(&HashSize::from_bit_length(20)?);
    let positions = bits.hash("pear tree")?.int_values(4)?;
    println!("Bloom filter positions: {:?}", positions);

    // Three different cards from a deck of 52
    let deck = hasher.distinct(3, &HashSize::from_u32(52)?)?;
    for word in ["one", "two", "three"] {
        let mut code = deck.hash(word)?;
        let cards = code.int_values(3)?;
        println!("Cards for '{}': {:?} (more: {})", word, cards, code.has_next());
    }

    Ok(())
}
