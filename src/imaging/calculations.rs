//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Height that keeps the source aspect ratio at `width`.
///
/// `round(natural_height * width / natural_width)`, never less than 1.
///
/// # Examples
/// ```
/// # use srcsetify::imaging::proportional_height;
/// assert_eq!(proportional_height((1200, 800), 320), 213);
/// assert_eq!(proportional_height((1200, 800), 640), 427);
/// ```
pub fn proportional_height(natural: (u32, u32), width: u32) -> u32 {
    let (natural_w, natural_h) = natural;
    if natural_w == 0 {
        return 1;
    }
    let height = (natural_h as f64 * width as f64 / natural_w as f64).round() as u32;
    height.max(1)
}

/// Output dimensions for a target width under a fit-inside, never-enlarge
/// policy.
///
/// Widths above the natural width are clamped to it, so the result never
/// exceeds the source in either dimension.
pub fn fit_inside(natural: (u32, u32), target_width: u32) -> (u32, u32) {
    let width = target_width.clamp(1, natural.0.max(1));
    (width, proportional_height(natural, width))
}

/// Whether producing `target` from `natural` needs any resampling at all.
///
/// At the natural size the variant is a pure format re-encode.
pub fn needs_resize(natural: (u32, u32), target: (u32, u32)) -> bool {
    natural != target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_for_landscape_ladder() {
        let natural = (1200, 800);
        let heights: Vec<u32> = [320, 480, 640, 768, 1024, 1200]
            .iter()
            .map(|&w| proportional_height(natural, w))
            .collect();
        assert_eq!(heights, vec![213, 320, 427, 512, 683, 800]);
    }

    #[test]
    fn height_for_portrait() {
        // 600x900 at 320 → 480
        assert_eq!(proportional_height((600, 900), 320), 480);
    }

    #[test]
    fn height_rounds_half_up() {
        // 3 * 1 / 2 = 1.5 → 2
        assert_eq!(proportional_height((2, 3), 1), 2);
    }

    #[test]
    fn height_never_below_one() {
        // Extreme panorama: 10000x10 at 320 → 0.32 → clamped to 1
        assert_eq!(proportional_height((10000, 10), 320), 1);
    }

    #[test]
    fn fit_inside_never_enlarges() {
        assert_eq!(fit_inside((300, 200), 768), (300, 200));
    }

    #[test]
    fn fit_inside_scales_down() {
        assert_eq!(fit_inside((1200, 800), 480), (480, 320));
    }

    #[test]
    fn natural_size_is_reencode_only() {
        assert!(!needs_resize((1200, 800), (1200, 800)));
        assert!(needs_resize((1200, 800), (480, 320)));
    }
}
