/// Tag palette used for label chips.
pub const PALETTE: [&str; 20] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7",
    "#DFE6E9", "#74B9FF", "#A29BFE", "#FD79A8", "#FDCB6E",
    "#6C5CE7", "#00B894", "#00CEC9", "#0984E3", "#E17055",
    "#E84393", "#2D3436", "#636E72", "#B2BEC3", "#55EFC4",
];

/// Stable colour for a label: the same label always gets the same chip colour.
pub fn assign_color(label: &str) -> &'static str {
    // FNV-1a; std's hasher is randomly seeded per process.
    let mut hash: u32 = 0x811c_9dc5;
    for byte in label.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    PALETTE[hash as usize % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_label_same_color() {
        assert_eq!(assign_color("work"), assign_color("work"));
        assert!(PALETTE.contains(&assign_color("")));
    }

    #[test]
    fn labels_spread_over_palette() {
        let labels = ["home", "work", "errand", "urgent", "call", "email", "review", "bug"];
        let mut colors: Vec<&str> = labels.iter().map(|l| assign_color(l)).collect();
        colors.sort();
        colors.dedup();
        assert!(colors.len() > 1);
    }
}
