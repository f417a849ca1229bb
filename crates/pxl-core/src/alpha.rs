//! Alpha conventions.

/// How the alpha channel relates to the color channels of a pixel.
///
/// - `Opaque` - alpha is known to be 1 everywhere
/// - `Premul` - color channels are pre-scaled by alpha
/// - `Unpremul` - color channels are independent of alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaType {
    /// Every pixel is fully opaque.
    Opaque,
    /// Color channels are multiplied by alpha.
    #[default]
    Premul,
    /// Color channels are stored independently of alpha.
    Unpremul,
}

impl AlphaType {
    /// Returns `true` for [`AlphaType::Opaque`].
    #[inline]
    pub const fn is_opaque(self) -> bool {
        matches!(self, Self::Opaque)
    }

    /// Returns `true` for [`AlphaType::Premul`].
    #[inline]
    pub const fn is_premul(self) -> bool {
        matches!(self, Self::Premul)
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Opaque => "opaque",
            Self::Premul => "premul",
            Self::Unpremul => "unpremul",
        }
    }
}

impl std::fmt::Display for AlphaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
