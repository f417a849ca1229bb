//! # pxl-primaries
//!
//! RGB primaries and the matrices that take linear RGB to CIE XYZ.
//!
//! Color spaces are compared and converted through XYZ adapted to a D50
//! white (the ICC profile connection space), so [`to_xyz_d50`] is the
//! matrix a color space carries.
//!
//! | Primaries | White |
//! |-----------|-------|
//! | [`SRGB`] / [`REC709`] | D65 |
//! | [`DISPLAY_P3`] | D65 |
//! | [`DCI_P3`] | DCI |
//! | [`REC2020`] | D65 |
//! | [`ADOBE_RGB`] | D65 |
//! | [`PROPHOTO_RGB`] | D50 |
//!
//! ```rust
//! use pxl_primaries::{to_xyz_d50, SRGB};
//! use pxl_math::{Vec3, D50};
//!
//! let m = to_xyz_d50(&SRGB).unwrap();
//! let white = m * Vec3::ONE;
//! assert!(white.max_abs_diff(D50) < 1e-3);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use pxl_math::{BRADFORD, D50, Mat3, Vec3, adapt_matrix, xy_to_xyz};

/// Chromaticities of the three primaries and the white point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primaries {
    /// Red xy.
    pub r: (f32, f32),
    /// Green xy.
    pub g: (f32, f32),
    /// Blue xy.
    pub b: (f32, f32),
    /// White xy.
    pub w: (f32, f32),
    /// Human-readable name.
    pub name: &'static str,
}

impl Primaries {
    /// White point as XYZ with Y = 1.
    #[inline]
    pub fn white_xyz(&self) -> Vec3 {
        xy_to_xyz(self.w.0, self.w.1)
    }
}

/// D65 white.
pub const D65_XY: (f32, f32) = (0.31270, 0.32900);
/// D50 white.
pub const D50_XY: (f32, f32) = (0.34567, 0.35850);
/// DCI projector white.
pub const DCI_XY: (f32, f32) = (0.31400, 0.35100);

/// sRGB / Rec.709.
pub const SRGB: Primaries = Primaries {
    r: (0.6400, 0.3300),
    g: (0.3000, 0.6000),
    b: (0.1500, 0.0600),
    w: D65_XY,
    name: "sRGB",
};

/// Rec.709 shares sRGB primaries.
pub const REC709: Primaries = SRGB;

/// ITU-R BT.2020.
pub const REC2020: Primaries = Primaries {
    r: (0.7080, 0.2920),
    g: (0.1700, 0.7970),
    b: (0.1310, 0.0460),
    w: D65_XY,
    name: "Rec.2020",
};

/// DCI-P3 with the theatrical white.
pub const DCI_P3: Primaries = Primaries {
    r: (0.6800, 0.3200),
    g: (0.2650, 0.6900),
    b: (0.1500, 0.0600),
    w: DCI_XY,
    name: "DCI-P3",
};

/// P3 primaries with a D65 white.
pub const DISPLAY_P3: Primaries = Primaries {
    r: (0.6800, 0.3200),
    g: (0.2650, 0.6900),
    b: (0.1500, 0.0600),
    w: D65_XY,
    name: "Display P3",
};

/// Adobe RGB (1998).
pub const ADOBE_RGB: Primaries = Primaries {
    r: (0.6400, 0.3300),
    g: (0.2100, 0.7100),
    b: (0.1500, 0.0600),
    w: D65_XY,
    name: "Adobe RGB",
};

/// ProPhoto RGB (ROMM).
pub const PROPHOTO_RGB: Primaries = Primaries {
    r: (0.7347, 0.2653),
    g: (0.1596, 0.8404),
    b: (0.0366, 0.0001),
    w: D50_XY,
    name: "ProPhoto RGB",
};

/// Linear RGB -> XYZ relative to the primaries' own white.
///
/// Columns are the primaries' XYZ scaled so that RGB (1, 1, 1) lands on the
/// white point. `None` if the primaries are collinear.
pub fn rgb_to_xyz_matrix(primaries: &Primaries) -> Option<Mat3> {
    let r = xy_to_xyz(primaries.r.0, primaries.r.1);
    let g = xy_to_xyz(primaries.g.0, primaries.g.1);
    let b = xy_to_xyz(primaries.b.0, primaries.b.1);

    let s = Mat3::from_col_vecs(r, g, b).inverse()? * primaries.white_xyz();
    Some(Mat3::from_col_vecs(r * s.x, g * s.y, b * s.z))
}

/// Linear RGB -> XYZ with a Bradford adaptation to D50.
pub fn to_xyz_d50(primaries: &Primaries) -> Option<Mat3> {
    let to_xyz = rgb_to_xyz_matrix(primaries)?;
    Some(adapt_matrix(BRADFORD, primaries.white_xyz(), D50) * to_xyz)
}

/// Linear RGB in `src` -> linear RGB in `dst`.
pub fn rgb_to_rgb_matrix(src: &Primaries, dst: &Primaries) -> Option<Mat3> {
    Some(to_xyz_d50(dst)?.inverse()? * to_xyz_d50(src)?)
}
