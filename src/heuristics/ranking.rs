use super::html::{has_code_blocks, has_images, strip_tags};

/// Content signals the ranking ladder looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentSignals {
    pub text_len: usize,
    pub has_attachments: bool,
    pub has_code: bool,
    pub has_images: bool,
}

impl ContentSignals {
    pub fn from_html(html: &str, attachment_count: usize) -> Self {
        Self {
            text_len: strip_tags(html).chars().count(),
            has_attachments: attachment_count > 0,
            has_code: has_code_blocks(html),
            has_images: has_images(html),
        }
    }
}

/// Ranking in 1..=5 for records that do not carry one.
pub fn compute_ranking(s: ContentSignals) -> u8 {
    if s.text_len > 3000 && s.has_attachments && s.has_code {
        5
    } else if s.text_len > 2000 && (s.has_attachments || s.has_code) {
        4
    } else if s.text_len > 1500 && s.has_images {
        3
    } else if s.text_len > 1000 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(text_len: usize, has_attachments: bool, has_code: bool, has_images: bool) -> ContentSignals {
        ContentSignals { text_len, has_attachments, has_code, has_images }
    }

    #[test]
    fn ladder_thresholds() {
        assert_eq!(compute_ranking(signals(3001, true, true, false)), 5);
        assert_eq!(compute_ranking(signals(3000, true, true, false)), 4);
        assert_eq!(compute_ranking(signals(2001, false, true, false)), 4);
        assert_eq!(compute_ranking(signals(1501, false, false, true)), 3);
        assert_eq!(compute_ranking(signals(1001, false, false, false)), 2);
        assert_eq!(compute_ranking(signals(1000, true, true, true)), 1);
        assert_eq!(compute_ranking(ContentSignals::default()), 1);
    }

    #[test]
    fn never_decreases_with_length() {
        for flags in 0..8u8 {
            let (a, c, i) = (flags & 1 != 0, flags & 2 != 0, flags & 4 != 0);
            let mut prev = 0;
            for len in (0..4000).step_by(50) {
                let r = compute_ranking(signals(len, a, c, i));
                assert!((1..=5).contains(&r));
                assert!(r >= prev, "len {len} flags {flags}: {r} < {prev}");
                prev = r;
            }
        }
    }

    #[test]
    fn signals_ignore_markup_length() {
        let html = format!("<pre><code>{}</code></pre>", "x".repeat(2500));
        let s = ContentSignals::from_html(&html, 0);
        assert_eq!(s.text_len, 2500);
        assert!(s.has_code);
        assert_eq!(compute_ranking(s), 4);
    }
}
