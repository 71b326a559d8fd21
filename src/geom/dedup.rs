//! Sort-based row deduplication.
//!
//! Rows are compared by exact f32 bit pattern (so `0.0` and `-0.0` stay
//! distinct) and unique rows come out in lexicographic bit order. Equal
//! input always gives equal output.

/// Deduplicate rows, returning the unique rows and, for each input row, the
/// index of its unique row.
pub(crate) fn dedup_rows<const N: usize>(rows: &[[f32; N]]) -> (Vec<[f32; N]>, Vec<u32>) {
    let keys: Vec<[u32; N]> = rows.iter().map(|row| row.map(f32::to_bits)).collect();

    let mut order: Vec<u32> = (0..rows.len() as u32).collect();
    order.sort_unstable_by(|&a, &b| keys[a as usize].cmp(&keys[b as usize]));

    let mut unique = Vec::new();
    let mut inverse = vec![0u32; rows.len()];
    let mut previous: Option<&[u32; N]> = None;

    for &i in &order {
        let key = &keys[i as usize];
        if previous != Some(key) {
            unique.push(rows[i as usize]);
            previous = Some(key);
        }
        inverse[i as usize] = (unique.len() - 1) as u32;
    }

    (unique, inverse)
}

/// Sorted unique values and, for each input value, its index in them.
pub(crate) fn unique_ids(values: &[u32]) -> (Vec<u32>, Vec<u32>) {
    let mut unique = values.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let inverse = values
        .iter()
        .map(|v| unique.partition_point(|u| u < v) as u32)
        .collect();

    (unique, inverse)
}
