//! Short text summaries of a loaded image for UI panels and CLI output.

use crate::cll::ImageCLL;
use crate::info::ImageInfo;
use std::fmt;

/// Formats an [`ImageInfo`] and its [`ImageCLL`] as a multi-line report.
#[derive(Debug, Clone, Copy)]
pub struct ImageSummary<'a> {
    info: &'a ImageInfo,
    cll: &'a ImageCLL,
}

impl<'a> ImageSummary<'a> {
    /// Creates a summary.
    pub fn new(info: &'a ImageInfo, cll: &'a ImageCLL) -> Self {
        Self { info, cll }
    }
}

impl fmt::Display for ImageSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.info;
        if !info.is_valid() {
            return writeln!(f, "  Image could not be loaded");
        }
        let (w, h) = info.size();
        writeln!(f, "  Kind:        {}", info.kind())?;
        writeln!(f, "  Resolution:  {w}x{h}")?;
        writeln!(
            f,
            "  Format:      {} bpp, {} bpc{}",
            info.bits_per_pixel(),
            info.bits_per_channel(),
            if info.is_float() { ", float" } else { "" }
        )?;
        writeln!(f, "  Profiles:    {}", info.profile_count())?;
        if info.forced_bt2100() {
            writeln!(f, "  Colorspace:  BT.2100 PQ")?;
        }
        if info.has_gain_map() {
            let (gw, gh) = info.gain_map_size();
            writeln!(f, "  Gain map:    {gw}x{gh}")?;
        }
        writeln!(f, "  Max CLL:     {}", self.cll.max_label())?;
        writeln!(f, "  Median CLL:  {}", self.cll.median_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;

    #[test]
    fn test_summary_text() {
        let info = ImageInfo::builder()
            .format(PixelFormat::RGBA32F)
            .size(64, 32)
            .build()
            .unwrap();
        let cll = ImageCLL::new(1200.0, 95.0, true);
        let text = ImageSummary::new(&info, &cll).to_string();
        assert!(text.contains("High Dynamic Range"));
        assert!(text.contains("64x32"));
        assert!(text.contains("float"));
        assert!(text.contains("1200.0 nits"));
    }

    #[test]
    fn test_summary_invalid() {
        let info = ImageInfo::invalid();
        let text = ImageSummary::new(&info, &ImageCLL::UNKNOWN).to_string();
        assert!(text.contains("could not be loaded"));
    }
}
