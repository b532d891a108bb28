use bitflags::bitflags;

bitflags! {
    /// Selects metadata fields for [`Document::get_meta`] and
    /// [`Document::set_meta`].
    ///
    /// Bits are grouped by the kind of element they address. A single call
    /// may combine bits of one group only.
    ///
    /// [`Document::get_meta`]: crate::model::Document::get_meta
    /// [`Document::set_meta`]: crate::model::Document::set_meta
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MetaMask: u32 {
        // =====================================================================
        // ROOT
        // =====================================================================

        /// Schema version.
        const ROOT_VERSION = 1 << 0;

        /// Document category. Reported only for version 1 documents.
        const ROOT_CATEGORY = 1 << 1;

        /// Base64 preview image.
        const ROOT_PREVIEW = 1 << 2;

        /// Root element name.
        const ROOT_TAG = 1 << 3;

        /// Path the document was opened from.
        const ROOT_FILE_PATH = 1 << 4;

        // =====================================================================
        // PLUGIN
        // =====================================================================

        const PLUGIN_NAME = 1 << 5;
        const PLUGIN_TYPE = 1 << 6;
        const PLUGIN_CLASS = 1 << 7;
        const PLUGIN_VERSION = 1 << 8;

        // =====================================================================
        // PARAMETER
        // =====================================================================

        const PARAM_NAME = 1 << 9;
        const PARAM_TYPE = 1 << 10;
        const PARAM_CUSTOM = 1 << 11;
        const PARAM_FILE_PATH = 1 << 12;

        // =====================================================================
        // GROUPS
        // =====================================================================

        const ROOT = Self::ROOT_VERSION.bits()
            | Self::ROOT_CATEGORY.bits()
            | Self::ROOT_PREVIEW.bits()
            | Self::ROOT_TAG.bits()
            | Self::ROOT_FILE_PATH.bits();

        const PLUGIN = Self::PLUGIN_NAME.bits()
            | Self::PLUGIN_TYPE.bits()
            | Self::PLUGIN_CLASS.bits()
            | Self::PLUGIN_VERSION.bits();

        const PARAM = Self::PARAM_NAME.bits()
            | Self::PARAM_TYPE.bits()
            | Self::PARAM_CUSTOM.bits()
            | Self::PARAM_FILE_PATH.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_partition() {
        assert!(MetaMask::ROOT.intersection(MetaMask::PLUGIN).is_empty());
        assert!(MetaMask::PLUGIN.intersection(MetaMask::PARAM).is_empty());
        assert!(MetaMask::ROOT.intersection(MetaMask::PARAM).is_empty());
        assert_eq!(
            MetaMask::ROOT | MetaMask::PLUGIN | MetaMask::PARAM,
            MetaMask::all()
        );
    }

    #[test]
    fn test_boundary_bits() {
        assert_eq!(MetaMask::ROOT.bits(), 0x1f);
        assert_eq!(MetaMask::PLUGIN_NAME.bits(), 0x20);
        assert_eq!(
            MetaMask::from_bits(0x1800),
            Some(MetaMask::PARAM_CUSTOM | MetaMask::PARAM_FILE_PATH)
        );
        assert_eq!(MetaMask::from_bits(1 << 20), None);
    }
}
