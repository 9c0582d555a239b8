use super::types::{TreeParams, Variant};
use crate::{SmtError, SmtResult};

/// Builder used to assemble [`TreeParams`] with validation.
///
/// | Field | Default |
/// |-------|---------|
/// | `variant` | [`Variant::HashZero`] |
/// | `levels` | `160` |
/// | `sort_hash` | `false` |
#[derive(Debug, Clone)]
pub struct TreeParamsBuilder {
    pub variant: Variant,
    pub levels: u16,
    pub sort_hash: bool,
}

impl TreeParamsBuilder {
    /// Returns a builder initialised with the defaults above.
    pub fn new() -> Self {
        Self {
            variant: Variant::HashZero,
            levels: 160,
            sort_hash: false,
        }
    }

    /// Selects the variant.
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the level count. Validated by [`TreeParamsBuilder::build`].
    pub fn levels(mut self, levels: u16) -> Self {
        self.levels = levels;
        self
    }

    /// Enables or disables sort-hash mode.
    pub fn sort_hash(mut self, sort_hash: bool) -> Self {
        self.sort_hash = sort_hash;
        self
    }

    /// Validates and freezes the parameters.
    pub fn build(self) -> SmtResult<TreeParams> {
        if self.levels < 2 || self.levels > 256 {
            return Err(SmtError::LevelsOutOfRange {
                levels: self.levels,
            });
        }
        Ok(TreeParams {
            variant: self.variant,
            levels: self.levels,
            sort_hash: self.sort_hash,
        })
    }
}

impl Default for TreeParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let params = TreeParamsBuilder::new().build().unwrap();
        assert_eq!(params.variant(), Variant::HashZero);
        assert_eq!(params.levels(), 160);
        assert!(!params.sort_hash());
    }

    #[test]
    fn level_bounds_enforced() {
        for levels in [0u16, 1, 257, 1024] {
            let err = TreeParamsBuilder::new().levels(levels).build().unwrap_err();
            assert_eq!(err, SmtError::LevelsOutOfRange { levels });
        }
        assert!(TreeParamsBuilder::new().levels(2).build().is_ok());
        assert!(TreeParamsBuilder::new().levels(256).build().is_ok());
    }
}
