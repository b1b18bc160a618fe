/// A polygon set that cannot form a valid planar profile. Ring indices count
/// the outer boundary as 0 and holes from 1.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DegenerateProfileError {
    #[error("ring {ring} has {distinct} distinct vertices, at least 3 are required")]
    TooFewVertices { ring: usize, distinct: usize },

    #[error("ring {ring} encloses no area")]
    ZeroArea { ring: usize },

    #[error("ring {ring} intersects itself between edges {first} and {second}")]
    SelfIntersecting {
        ring: usize,
        first: usize,
        second: usize,
    },

    #[error("hole {hole} is not contained in its outer boundary")]
    HoleNotContained { hole: usize },

    #[error("holes {first} and {second} overlap")]
    HolesOverlap { first: usize, second: usize },

    #[error("character {ch:?} (index {index}): {source}")]
    Character {
        ch: char,
        index: usize,
        #[source]
        source: Box<DegenerateProfileError>,
    },
}

impl DegenerateProfileError {
    pub fn in_character(self, ch: char, index: usize) -> Self {
        DegenerateProfileError::Character {
            ch,
            index,
            source: Box::new(self),
        }
    }
}
