#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub color: &'static str,
    pub name: &'static str,
}

/// Colors handed out to participants, in assignment order.
pub const PALETTE: [PaletteEntry; 6] = [
    PaletteEntry {
        color: "#ff4444",
        name: "Red",
    },
    PaletteEntry {
        color: "#4444ff",
        name: "Blue",
    },
    PaletteEntry {
        color: "#44ff44",
        name: "Green",
    },
    PaletteEntry {
        color: "#ffff44",
        name: "Yellow",
    },
    PaletteEntry {
        color: "#ff44ff",
        name: "Magenta",
    },
    PaletteEntry {
        color: "#44ffff",
        name: "Cyan",
    },
];
