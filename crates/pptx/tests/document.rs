use deck_core::classify::two_column_roles;
use deck_core::{Geometry, Placeholder, ShapeKind};
use deck_pptx::fixtures::{FixtureDeck, FixtureShape};
use deck_pptx::PptxDocument;
use std::io::Cursor;

fn sample_deck() -> FixtureDeck {
    FixtureDeck::new()
        .slide(vec![
            FixtureShape::text(0.5, 0.3, 9.0, 0.8, "Title"),
            FixtureShape::picture(1.0, 1.5, 4.0, 3.0),
        ])
        .slide(vec![FixtureShape::text(0.5, 1.0, 4.0, 2.0, "First line\nSecond line")])
}

fn load(bytes: Vec<u8>) -> PptxDocument {
    PptxDocument::from_reader(Cursor::new(bytes)).unwrap()
}

fn save(doc: &PptxDocument) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    doc.write_to(&mut out).unwrap();
    out.into_inner()
}

#[test]
fn test_open_fixture_deck() {
    let doc = load(sample_deck().to_bytes().unwrap());
    let deck = doc.deck();

    assert_eq!(deck.slides.len(), 2);
    let (w, h) = deck.size_inches();
    assert!((w - 10.0).abs() < 1e-9);
    assert!((h - 5.625).abs() < 1e-9);

    let first = deck.slide(1).unwrap();
    assert_eq!(first.part_name, "ppt/slides/slide1.xml");
    assert_eq!(first.shapes.len(), 2);
    assert_eq!(first.shapes[0].kind, ShapeKind::TextFrame);
    assert_eq!(first.shapes[0].text_or_empty(), "Title");
    assert_eq!(first.shapes[1].kind, ShapeKind::Picture);
    assert_eq!(first.shapes[1].geometry, Geometry::from_inches(1.0, 1.5, 4.0, 3.0));

    let second = deck.slide(2).unwrap();
    assert_eq!(second.shapes[0].text_or_empty(), "First line\nSecond line");
}

#[test]
fn test_unmodified_save_keeps_parts() {
    let doc = load(sample_deck().to_bytes().unwrap());
    let reopened = load(save(&doc));

    assert_eq!(doc.part_names(), reopened.part_names());
    for name in doc.part_names() {
        assert_eq!(doc.part(name), reopened.part(name), "part {} changed", name);
    }
}

#[test]
fn test_modified_shape_round_trips() {
    let mut doc = load(sample_deck().to_bytes().unwrap());
    let target = Geometry::from_inches(5.0, 0.8, 5.0, 3.75);
    doc.deck_mut().slide_mut(1).unwrap().shapes[1].geometry = target;

    let bytes = save(&doc);
    let reopened = load(bytes.clone());

    let slide = reopened.deck().slide(1).unwrap();
    assert_eq!(slide.shapes[1].geometry, target);
    assert_eq!(slide.shapes[0].geometry, Geometry::from_inches(0.5, 0.3, 9.0, 0.8));
    assert_eq!(
        doc.part("ppt/slides/slide2.xml"),
        reopened.part("ppt/slides/slide2.xml")
    );

    // The model now matches the file, so nothing is modified after reload.
    assert!(!reopened.deck().is_modified());
    // Saving the same model again is byte-identical.
    assert_eq!(save(&doc), bytes);
}

#[test]
fn test_shape_without_transform_gets_one() {
    let deck = FixtureDeck::new().slide(vec![FixtureShape::Text {
        rect: None,
        paragraphs: vec!["Floating".to_string()],
    }]);
    let mut doc = load(deck.to_bytes().unwrap());

    let shape = &doc.deck().slide(1).unwrap().shapes[0];
    assert!(!shape.has_xfrm);
    assert_eq!(shape.geometry, Geometry::default());

    let target = Geometry::from_inches(0.2, 1.1, 4.4, 2.2);
    doc.deck_mut().slide_mut(1).unwrap().shapes[0].geometry = target;
    let reopened = load(save(&doc));

    let shape = &reopened.deck().slide(1).unwrap().shapes[0];
    assert!(shape.has_xfrm);
    assert_eq!(shape.geometry, target);
    assert_eq!(shape.text_or_empty(), "Floating");
}

fn placeholder_deck() -> FixtureDeck {
    FixtureDeck::new()
        .with_master(vec![
            FixtureShape::placeholder_at("title", 0, (0.5, 0.2, 9.0, 1.0)),
            FixtureShape::placeholder_at("body", 1, (0.5, 1.5, 9.0, 3.5)),
        ])
        .with_layout(vec![
            FixtureShape::placeholder_at("title", 0, (0.5, 0.3, 9.0, 0.8)),
            FixtureShape::placeholder_at("body", 1, (6.0, 2.0, 3.0, 2.0)),
            FixtureShape::placeholder("subTitle", 2, ""),
        ])
        .slide(vec![
            FixtureShape::placeholder("title", 0, "Take It Further"),
            FixtureShape::placeholder("body", 1, "Slam Academy courses\nHistory of DJing"),
            FixtureShape::placeholder("subTitle", 2, "Manual beatmatching"),
        ])
}

#[test]
fn test_placeholders_inherit_layout_geometry() {
    let doc = load(placeholder_deck().to_bytes().unwrap());
    let shapes = &doc.deck().slide(1).unwrap().shapes;

    assert_eq!(shapes[0].geometry, Geometry::from_inches(0.5, 0.3, 9.0, 0.8));
    assert_eq!(shapes[1].geometry, Geometry::from_inches(6.0, 2.0, 3.0, 2.0));
    assert_eq!(shapes[1].placeholder, Some(Placeholder::new("body", 1)));
    // The layout subtitle has no transform either; the master body supplies it.
    assert_eq!(shapes[2].geometry, Geometry::from_inches(0.5, 1.5, 9.0, 3.5));
    assert!(shapes.iter().all(|s| !s.has_xfrm));
    assert!(!doc.deck().is_modified());

    let roles = two_column_roles(shapes);
    assert_eq!(roles.title, Some(0));
    assert_eq!(roles.left, Some(1));
    assert_eq!(roles.right, Some(2));
}

#[test]
fn test_moved_placeholder_gets_own_transform() {
    let mut doc = load(placeholder_deck().to_bytes().unwrap());
    let target = Geometry::from_inches(5.2, 1.4, 4.4, 3.6);
    doc.deck_mut().slide_mut(1).unwrap().shapes[1].geometry = target;

    let reopened = load(save(&doc));
    let shapes = &reopened.deck().slide(1).unwrap().shapes;
    assert!(shapes[1].has_xfrm);
    assert_eq!(shapes[1].geometry, target);
    assert!(!shapes[0].has_xfrm);
    assert_eq!(shapes[0].geometry, Geometry::from_inches(0.5, 0.3, 9.0, 0.8));
    assert_eq!(
        doc.part("ppt/slideLayouts/slideLayout1.xml"),
        reopened.part("ppt/slideLayouts/slideLayout1.xml")
    );
}

#[test]
fn test_not_a_zip() {
    assert!(PptxDocument::from_reader(Cursor::new(b"not a deck".to_vec())).is_err());
}
