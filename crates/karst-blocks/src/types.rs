/// Material of a single grid cell. `Air` is the empty sentinel; it is never
/// meshed and never appears in an extracted range.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Block {
    Grass = 0,
    Dirt = 1,
    Stone = 2,
    Snow = 3,
    Air = 4,
}

/// Number of solid (non-air) block types.
pub const SOLID_BLOCK_COUNT: usize = 4;

// Chunk cells store the label as a u8 code.
const _: () = assert!(SOLID_BLOCK_COUNT < 255);

impl Block {
    /// All solid types, in code order.
    pub const SOLID: [Block; SOLID_BLOCK_COUNT] =
        [Block::Grass, Block::Dirt, Block::Stone, Block::Snow];

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn from_code(code: u8) -> Option<Block> {
        match code {
            0 => Some(Block::Grass),
            1 => Some(Block::Dirt),
            2 => Some(Block::Stone),
            3 => Some(Block::Snow),
            4 => Some(Block::Air),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        matches!(self, Block::Air)
    }

    #[inline]
    pub const fn is_solid(self) -> bool {
        !self.is_air()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Block::Grass => "grass",
            Block::Dirt => "dirt",
            Block::Stone => "stone",
            Block::Snow => "snow",
            Block::Air => "air",
        }
    }
}
