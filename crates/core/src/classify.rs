//! Shape classification: partition a slide's shapes into layout roles.
//!
//! Every function here is pure. It takes the slide's shapes in enumeration
//! order and returns shape indices, at most one per role. A role with no
//! matching shape is `None`. Rules are applied in priority order
//! (title, then body text, then pictures), and the keyword lists and
//! position thresholds are the named constants below.

use crate::types::Shape;

/// Title threshold for most slides: shapes starting above 0.8" are titles.
pub const TITLE_MAX_TOP_IN: f64 = 0.8;

/// Tighter title threshold for the Practice & Next Steps slide.
pub const PRACTICE_TITLE_MAX_TOP_IN: f64 = 0.6;

/// Title text of the Take It Further slide, matched case-insensitively.
pub const TAKE_IT_FURTHER_TITLE: &str = "take it further";

/// Text identifying the left column of the Take It Further slide.
pub const TAKE_IT_FURTHER_LEFT: &[&str] = &["Slam Academy", "History of DJing"];

/// Text identifying the right column of the Take It Further slide.
pub const TAKE_IT_FURTHER_RIGHT: &[&str] = &["Manual beatmatching", "Harmonic mixing"];

/// Body text on the USB slide is wider than this; narrower boxes are labels.
pub const USB_CONTENT_MIN_WIDTH_IN: f64 = 2.0;

/// How a title shape is recognised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleRule<'a> {
    /// A text shape whose top is above this is a title.
    pub max_top_in: f64,

    /// A text shape containing this (case-insensitive) is a title.
    pub keyword: Option<&'a str>,
}

impl<'a> TitleRule<'a> {
    /// Position-only rule.
    pub const fn above(max_top_in: f64) -> Self {
        Self {
            max_top_in,
            keyword: None,
        }
    }

    /// Position rule with an additional title keyword.
    pub const fn above_or_containing(max_top_in: f64, keyword: &'a str) -> Self {
        Self {
            max_top_in,
            keyword: Some(keyword),
        }
    }

    pub fn matches(&self, shape: &Shape) -> bool {
        let by_keyword = self.keyword.is_some_and(|k| {
            shape
                .text_or_empty()
                .to_lowercase()
                .contains(&k.to_lowercase())
        });
        by_keyword || shape.geometry.top_in() < self.max_top_in
    }
}

/// Title and remaining body text of a slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleSplit {
    pub title: Option<usize>,
    pub content: Vec<usize>,
}

/// Indices of text-bearing shapes.
pub fn text_shapes(shapes: &[Shape]) -> Vec<usize> {
    shapes
        .iter()
        .filter(|s| s.has_text_frame())
        .map(|s| s.index)
        .collect()
}

/// Indices of picture shapes.
pub fn pictures(shapes: &[Shape]) -> Vec<usize> {
    shapes
        .iter()
        .filter(|s| s.is_picture())
        .map(|s| s.index)
        .collect()
}

/// Split text shapes into a title and content.
///
/// When several shapes satisfy the rule the last one wins; the earlier
/// matches belong to neither role.
pub fn split_title(shapes: &[Shape], rule: &TitleRule<'_>) -> TitleSplit {
    let mut split = TitleSplit::default();
    for idx in text_shapes(shapes) {
        if rule.matches(&shapes[idx]) {
            split.title = Some(idx);
        } else {
            split.content.push(idx);
        }
    }
    split
}

/// Sort indices by the left edge of their shapes, keeping enumeration order on ties.
fn sorted_by_left(shapes: &[Shape], indices: &[usize]) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_by(|&a, &b| {
        shapes[a]
            .geometry
            .left
            .cmp(&shapes[b].geometry.left)
    });
    sorted
}

/// Last shape among `indices` whose text contains any of `keywords`.
fn last_containing(shapes: &[Shape], indices: &[usize], keywords: &[&str]) -> Option<usize> {
    indices.iter().copied().rev().find(|&idx| {
        let text = shapes[idx].text_or_empty();
        keywords.iter().any(|k| text.contains(k))
    })
}

/// Roles on the two-column text slide (Take It Further).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwoColumnRoles {
    pub title: Option<usize>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

/// Classify the two-column text slide.
///
/// Columns are found by their keywords. Only when neither keyword set
/// matches are the first two content shapes, ordered left to right, used.
pub fn two_column_roles(shapes: &[Shape]) -> TwoColumnRoles {
    let split = split_title(
        shapes,
        &TitleRule::above_or_containing(TITLE_MAX_TOP_IN, TAKE_IT_FURTHER_TITLE),
    );

    // A shape matching both sets is claimed by the left column.
    let left = last_containing(shapes, &split.content, TAKE_IT_FURTHER_LEFT);
    let remaining: Vec<usize> = split
        .content
        .iter()
        .copied()
        .filter(|&idx| {
            let text = shapes[idx].text_or_empty();
            !TAKE_IT_FURTHER_LEFT.iter().any(|k| text.contains(k))
        })
        .collect();
    let right = last_containing(shapes, &remaining, TAKE_IT_FURTHER_RIGHT);

    if left.is_none() && right.is_none() && split.content.len() >= 2 {
        let sorted = sorted_by_left(shapes, &split.content);
        return TwoColumnRoles {
            title: split.title,
            left: sorted.first().copied(),
            right: sorted.get(1).copied(),
        };
    }

    TwoColumnRoles {
        title: split.title,
        left,
        right,
    }
}

/// Roles on the beats/bars/phrases slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramRoles {
    pub title: Option<usize>,
    pub content: Vec<usize>,
    /// Waveform with beat/bar/phrase labels (near 2.3:1).
    pub song_body: Option<usize>,
    /// The very wide 16-beat grid (near 5.8:1).
    pub beat_grid: Option<usize>,
}

impl DiagramRoles {
    /// Whether only a single picture was found, which is placed as the song body.
    pub fn single_picture(&self) -> bool {
        self.song_body.is_some() && self.beat_grid.is_none()
    }
}

/// Classify the beats/bars/phrases slide.
///
/// Of the first two pictures the one with the strictly higher aspect ratio
/// is the beat grid; on a tie the second picture is.
pub fn diagram_roles(shapes: &[Shape]) -> DiagramRoles {
    let split = split_title(shapes, &TitleRule::above(TITLE_MAX_TOP_IN));
    let pics = pictures(shapes);

    let (song_body, beat_grid) = match pics.as_slice() {
        [] => (None, None),
        [only] => (Some(*only), None),
        [first, second, ..] => {
            let ar1 = shapes[*first].geometry.aspect_ratio();
            let ar2 = shapes[*second].geometry.aspect_ratio();
            if ar1 > ar2 {
                (Some(*second), Some(*first))
            } else {
                (Some(*first), Some(*second))
            }
        }
    };

    DiagramRoles {
        title: split.title,
        content: split.content,
        song_body,
        beat_grid,
    }
}

/// Roles on the Who Am I? slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoRoles {
    pub title: Option<usize>,
    pub content: Option<usize>,
    pub dj_photo: Option<usize>,
    pub meme: Option<usize>,
}

/// Classify the Who Am I? slide.
///
/// The last non-title text shape is the content. Of the first two pictures
/// the strictly larger one is the DJ photo; otherwise the second is. A lone
/// picture is the DJ photo and there is no meme.
pub fn photo_roles(shapes: &[Shape]) -> PhotoRoles {
    let split = split_title(shapes, &TitleRule::above(TITLE_MAX_TOP_IN));
    let pics = pictures(shapes);

    let (dj_photo, meme) = match pics.as_slice() {
        [] => (None, None),
        [only] => (Some(*only), None),
        [first, second, ..] => {
            let area1 = shapes[*first].geometry.area_in2();
            let area2 = shapes[*second].geometry.area_in2();
            if area1 > area2 {
                (Some(*first), Some(*second))
            } else {
                (Some(*second), Some(*first))
            }
        }
    };

    PhotoRoles {
        title: split.title,
        content: split.content.last().copied(),
        dj_photo,
        meme,
    }
}

/// Roles on a generic text-left, image-right slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextWithImageRoles {
    pub title: Option<usize>,
    pub content: Vec<usize>,
    pub image: Option<usize>,
}

pub fn text_with_image_roles(shapes: &[Shape]) -> TextWithImageRoles {
    let split = split_title(shapes, &TitleRule::above(TITLE_MAX_TOP_IN));
    TextWithImageRoles {
        title: split.title,
        content: split.content,
        image: pictures(shapes).first().copied(),
    }
}

/// Roles on the Exporting to USB slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsbRoles {
    pub title: Option<usize>,
    pub content: Option<usize>,
    pub usb_drive: Option<usize>,
    pub screenshot: Option<usize>,
}

/// Classify the Exporting to USB slide.
///
/// Narrow text boxes are labels and keep their geometry. Pictures are
/// ranked by area: the largest is the USB drive, the next the screenshot.
/// Both are only assigned when the slide has at least two pictures.
pub fn usb_roles(shapes: &[Shape]) -> UsbRoles {
    let rule = TitleRule::above(TITLE_MAX_TOP_IN);
    let mut roles = UsbRoles::default();
    for idx in text_shapes(shapes) {
        let shape = &shapes[idx];
        if rule.matches(shape) {
            roles.title = Some(idx);
        } else if shape.geometry.width_in() > USB_CONTENT_MIN_WIDTH_IN {
            roles.content = Some(idx);
        }
    }

    let mut pics = pictures(shapes);
    if pics.len() >= 2 {
        pics.sort_by(|&a, &b| {
            shapes[b]
                .geometry
                .area_in2()
                .partial_cmp(&shapes[a].geometry.area_in2())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        roles.usb_drive = Some(pics[0]);
        roles.screenshot = Some(pics[1]);
    }
    roles
}

/// Body text layout on the Practice & Next Steps slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeColumns {
    None,
    Single(usize),
    Pair { left: usize, right: usize },
}

/// Roles on the Practice & Next Steps slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeRoles {
    pub title: Option<usize>,
    pub columns: PracticeColumns,
    pub image: Option<usize>,
}

pub fn practice_roles(shapes: &[Shape]) -> PracticeRoles {
    let split = split_title(shapes, &TitleRule::above(PRACTICE_TITLE_MAX_TOP_IN));
    let columns = match split.content.as_slice() {
        [] => PracticeColumns::None,
        [only] => PracticeColumns::Single(*only),
        content => {
            let sorted = sorted_by_left(shapes, content);
            PracticeColumns::Pair {
                left: sorted[0],
                right: sorted[1],
            }
        }
    };
    PracticeRoles {
        title: split.title,
        columns,
        image: pictures(shapes).first().copied(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{Geometry, ShapeKind, Slide};

    pub(crate) fn text(left: f64, top: f64, width: f64, height: f64, body: &str) -> Shape {
        Shape::new(
            ShapeKind::TextFrame,
            "TextBox",
            Geometry::from_inches(left, top, width, height),
        )
        .with_text(body)
    }

    pub(crate) fn picture(left: f64, top: f64, width: f64, height: f64) -> Shape {
        Shape::new(
            ShapeKind::Picture,
            "Picture",
            Geometry::from_inches(left, top, width, height),
        )
    }

    pub(crate) fn shapes(list: Vec<Shape>) -> Vec<Shape> {
        let mut slide = Slide::new(1, "ppt/slides/slide1.xml");
        for shape in list {
            slide.add_shape(shape);
        }
        slide.shapes
    }

    #[test]
    fn test_split_title_by_position() {
        let s = shapes(vec![
            text(0.5, 2.0, 4.0, 1.0, "Body"),
            text(0.5, 0.3, 9.0, 0.5, "Heading"),
            picture(5.0, 1.0, 3.0, 3.0),
        ]);
        let split = split_title(&s, &TitleRule::above(TITLE_MAX_TOP_IN));
        assert_eq!(split.title, Some(1));
        assert_eq!(split.content, vec![0]);
    }

    #[test]
    fn test_split_title_last_match_wins() {
        let s = shapes(vec![
            text(0.5, 0.1, 9.0, 0.5, "First"),
            text(0.5, 0.4, 9.0, 0.5, "Second"),
            text(0.5, 2.0, 4.0, 1.0, "Body"),
        ]);
        let split = split_title(&s, &TitleRule::above(TITLE_MAX_TOP_IN));
        assert_eq!(split.title, Some(1));
        assert_eq!(split.content, vec![2]);
    }

    #[test]
    fn test_title_keyword_is_case_insensitive() {
        let s = shapes(vec![text(0.2, 3.0, 9.0, 1.0, "Take It Further")]);
        let rule = TitleRule::above_or_containing(TITLE_MAX_TOP_IN, TAKE_IT_FURTHER_TITLE);
        assert_eq!(split_title(&s, &rule).title, Some(0));
    }

    #[test]
    fn test_two_column_by_keywords() {
        let s = shapes(vec![
            text(3.0, 1.5, 9.0, 4.9, "Manual beatmatching\nHarmonic mixing"),
            text(0.0, 0.2, 9.0, 0.7, "TAKE IT FURTHER"),
            text(3.0, 1.5, 9.0, 4.9, "Slam Academy\nHistory of DJing"),
        ]);
        assert_eq!(
            two_column_roles(&s),
            TwoColumnRoles { title: Some(1), left: Some(2), right: Some(0) }
        );
    }

    #[test]
    fn test_two_column_positional_fallback() {
        let s = shapes(vec![
            text(0.0, 0.2, 9.0, 0.7, "Title"),
            text(6.0, 1.5, 3.0, 3.0, "Beta"),
            text(1.0, 1.5, 3.0, 3.0, "Alpha"),
        ]);
        assert_eq!(
            two_column_roles(&s),
            TwoColumnRoles { title: Some(0), left: Some(2), right: Some(1) }
        );
    }

    #[test]
    fn test_two_column_no_fallback_when_one_side_matched() {
        let s = shapes(vec![
            text(6.0, 1.5, 3.0, 3.0, "Slam Academy"),
            text(1.0, 1.5, 3.0, 3.0, "Unrelated"),
        ]);
        let roles = two_column_roles(&s);
        assert_eq!(roles.left, Some(0));
        assert_eq!(roles.right, None);
    }

    #[test]
    fn test_diagram_roles_by_aspect() {
        let s = shapes(vec![
            text(0.0, 0.1, 9.0, 0.6, "Beats, Bars & Phrases"),
            picture(1.0, 1.0, 2.3, 1.0),
            picture(1.0, 3.0, 5.8, 1.0),
        ]);
        let roles = diagram_roles(&s);
        assert_eq!(roles.song_body, Some(1));
        assert_eq!(roles.beat_grid, Some(2));
        assert_eq!(roles.title, Some(0));
    }

    #[test]
    fn test_diagram_roles_aspect_tie_takes_second_as_grid() {
        let s = shapes(vec![picture(1.0, 1.0, 2.0, 1.0), picture(1.0, 3.0, 4.0, 2.0)]);
        let roles = diagram_roles(&s);
        assert_eq!(roles.song_body, Some(0));
        assert_eq!(roles.beat_grid, Some(1));
    }

    #[test]
    fn test_photo_roles_by_area() {
        let s = shapes(vec![
            picture(0.0, 3.0, 1.0, 1.1),
            picture(5.0, 1.0, 4.0, 4.0),
            text(0.2, 1.2, 4.0, 2.0, "I play records"),
        ]);
        let roles = photo_roles(&s);
        assert_eq!(roles.dj_photo, Some(1));
        assert_eq!(roles.meme, Some(0));
        assert_eq!(roles.content, Some(2));
        assert_eq!(roles.title, None);
    }

    #[test]
    fn test_usb_roles_ignore_labels() {
        let s = shapes(vec![
            text(0.0, 0.2, 9.0, 0.6, "Exporting to USB"),
            text(0.3, 1.3, 5.0, 2.0, "Plug in the drive"),
            text(6.0, 4.5, 1.2, 0.3, "label"),
            picture(0.9, 3.8, 5.0, 0.8),
            picture(5.5, 1.0, 4.0, 4.0),
        ]);
        let roles = usb_roles(&s);
        assert_eq!(roles.title, Some(0));
        assert_eq!(roles.content, Some(1));
        assert_eq!(roles.usb_drive, Some(4));
        assert_eq!(roles.screenshot, Some(3));
    }

    #[test]
    fn test_usb_single_picture_unassigned() {
        let s = shapes(vec![picture(5.5, 1.0, 4.0, 4.0)]);
        let roles = usb_roles(&s);
        assert_eq!(roles.usb_drive, None);
        assert_eq!(roles.screenshot, None);
    }

    #[test]
    fn test_practice_roles() {
        let s = shapes(vec![
            text(6.0, 0.7, 3.5, 0.6, "Practice & Next Steps"),
            text(5.2, 1.0, 4.0, 1.0, "Next steps"),
            text(0.4, 1.0, 4.0, 1.0, "Practice"),
            picture(0.5, 2.2, 9.0, 3.0),
        ]);
        let roles = practice_roles(&s);
        // 0.7" is below the tighter 0.6" title threshold.
        assert_eq!(roles.title, None);
        assert_eq!(roles.columns, PracticeColumns::Pair { left: 2, right: 1 });
        assert_eq!(roles.image, Some(3));
    }
}
