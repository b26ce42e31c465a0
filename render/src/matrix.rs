//! QR module matrix and the encoder seam.

use crate::config::EccLevel;
use crate::error::EncodeError;
use qrcode::types::QrError;

/// Rows of QR modules, `true` being a dark module.
///
/// Rows may have different lengths; the column count is the longest row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleMatrix {
    rows: Vec<Vec<bool>>,
}

impl ModuleMatrix {
    pub fn new(rows: Vec<Vec<bool>>) -> Self {
        Self { rows }
    }

    /// Builds a matrix from an encoded symbol, padding it with `quiet_zone`
    /// light modules on every side.
    pub fn from_code(code: &qrcode::QrCode, quiet_zone: u32) -> Self {
        let width = code.width();
        let border = quiet_zone as usize;
        let side = width + border * 2;

        let mut rows = vec![vec![false; side]; side];
        for (y, row) in code.to_colors().chunks(width).enumerate() {
            for (x, color) in row.iter().enumerate() {
                rows[y + border][x + border] = *color == qrcode::Color::Dark;
            }
        }

        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.column_count() == 0
    }

    /// Returns the module at column `x`, row `y`; out-of-range cells are light.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }
}

/// Turns text into a module matrix.
///
/// Abstracted so the widget can be driven by a fake encoder in tests.
pub trait Encoder: Send + Sync {
    fn encode(
        &self,
        text: &str,
        level: EccLevel,
        quiet_zone: u32,
    ) -> Result<ModuleMatrix, EncodeError>;
}

/// Encoder backed by the `qrcode` crate; picks the smallest fitting version.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder;

impl Encoder for QrEncoder {
    fn encode(
        &self,
        text: &str,
        level: EccLevel,
        quiet_zone: u32,
    ) -> Result<ModuleMatrix, EncodeError> {
        let code = qrcode::QrCode::with_error_correction_level(text.as_bytes(), level.into())
            .map_err(|err| match err {
                QrError::DataTooLong => EncodeError::capacity_exceeded(text.len(), level),
                other => EncodeError::rejected(other.to_string()),
            })?;

        log::debug!(
            "Encoded {} bytes at level {level}: {}x{} modules, quiet zone {quiet_zone}",
            text.len(),
            code.width(),
            code.width()
        );

        Ok(ModuleMatrix::from_code(&code, quiet_zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_rows_use_longest_row() {
        let matrix = ModuleMatrix::new(vec![vec![true], vec![true, false, true], vec![]]);
        assert_eq!(matrix.row_count(), 3);
        assert_eq!(matrix.column_count(), 3);
        assert!(matrix.get(2, 1));
        assert!(!matrix.get(2, 0), "missing cells read as light");
        assert!(!matrix.get(9, 9));
    }

    #[test]
    fn test_empty_matrix() {
        assert!(ModuleMatrix::default().is_empty());
        assert!(ModuleMatrix::new(vec![vec![], vec![]]).is_empty());
        assert!(!ModuleMatrix::new(vec![vec![false]]).is_empty());
    }

    #[test]
    fn test_encode_version_one_without_quiet_zone() {
        let matrix = QrEncoder
            .encode("ABC", EccLevel::L, 0)
            .expect("short text should encode");
        assert_eq!(matrix.row_count(), 21);
        assert_eq!(matrix.column_count(), 21);
        // Top-left finder pattern corner is always dark.
        assert!(matrix.get(0, 0));
        assert!(matrix.get(6, 6));
    }

    #[test]
    fn test_quiet_zone_pads_every_side() {
        let matrix = QrEncoder
            .encode("ABC", EccLevel::L, 4)
            .expect("short text should encode");
        assert_eq!(matrix.row_count(), 29);
        assert_eq!(matrix.column_count(), 29);

        for i in 0..29 {
            for border in [0, 3, 25, 28] {
                assert!(!matrix.get(i, border), "row {border} must be light");
                assert!(!matrix.get(border, i), "column {border} must be light");
            }
        }
        assert!(matrix.get(4, 4), "finder corner moves by the quiet zone");
    }

    #[test]
    fn test_higher_level_needs_more_modules() {
        let text = "https://example.com/a/fairly/long/path?with=query&and=more";
        let low = QrEncoder.encode(text, EccLevel::L, 0).expect("fits at L");
        let high = QrEncoder.encode(text, EccLevel::H, 0).expect("fits at H");
        assert!(high.column_count() > low.column_count());
    }

    #[test]
    fn test_capacity_exceeded() {
        // Version 40-H holds at most 1273 bytes.
        let text = "x".repeat(2000);
        let err = QrEncoder
            .encode(&text, EccLevel::H, 0)
            .expect_err("2000 bytes cannot fit at level H");
        assert_eq!(err, EncodeError::capacity_exceeded(2000, EccLevel::H));
    }
}
