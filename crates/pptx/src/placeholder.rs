//! Geometry that placeholders inherit from their slide layout and master.
//!
//! A placeholder on a slide often has no transform of its own. It then sits
//! where the layout placeholder with the same `idx` sits, and a layout
//! placeholder without a transform sits where the master placeholder of
//! its type does.

use crate::parser::{extract_raw_shapes, optional_part_text, related_part, Part, RawShape};
use deck_core::{Geometry, Placeholder, Result};

/// Placeholders of one layout (or master) with their resolved geometry.
#[derive(Debug, Clone, Default)]
pub(crate) struct PlaceholderMap {
    entries: Vec<(Placeholder, Geometry)>,
}

impl PlaceholderMap {
    /// Placeholders among `shapes` whose geometry is complete once `base`
    /// has filled in what each lacks.
    fn collect<F>(shapes: &[RawShape], base: F) -> Self
    where
        F: Fn(&Placeholder) -> Option<Geometry>,
    {
        let entries = shapes
            .iter()
            .filter_map(|raw| {
                let ph = raw.shape.placeholder.as_ref()?;
                let geometry = raw.complete_geometry(base(ph))?;
                Some((ph.clone(), geometry))
            })
            .collect();
        Self { entries }
    }

    /// Placeholder geometry of a slide master part.
    fn for_master(parts: &[Part], master: &str) -> Result<Self> {
        let Some(xml) = optional_part_text(parts, master)? else {
            log::warn!("Slide master {} not in package", master);
            return Ok(Self::default());
        };
        Ok(Self::collect(&extract_raw_shapes(xml)?, |_| None))
    }

    /// Placeholder geometry of a slide layout part, completed from its master.
    pub(crate) fn for_layout(parts: &[Part], layout: &str) -> Result<Self> {
        let Some(xml) = optional_part_text(parts, layout)? else {
            log::warn!("Slide layout {} not in package", layout);
            return Ok(Self::default());
        };
        let master = match related_part(parts, layout, "slideMaster")? {
            Some(master) => Self::for_master(parts, &master)?,
            None => Self::default(),
        };
        let map = Self::collect(&extract_raw_shapes(xml)?, |ph| master.by_master_kind(ph));
        log::debug!("{}: {} placeholders with geometry", layout, map.entries.len());
        Ok(map)
    }

    /// Geometry a slide placeholder inherits: same `idx`, else same type.
    pub(crate) fn for_slide(&self, ph: &Placeholder) -> Option<Geometry> {
        self.entries
            .iter()
            .find(|(p, _)| p.idx == ph.idx)
            .or_else(|| self.entries.iter().find(|(p, _)| p.kind == ph.kind))
            .map(|(_, g)| *g)
    }

    /// Geometry a layout placeholder inherits from this master.
    fn by_master_kind(&self, ph: &Placeholder) -> Option<Geometry> {
        let kind = ph.master_kind();
        self.entries
            .iter()
            .find(|(p, _)| p.kind == kind)
            .map(|(_, g)| *g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(shapes: &str) -> String {
        format!(
            r#"<p:sldLayout xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr>{}</p:spTree></p:cSld></p:sldLayout>"#,
            shapes
        )
    }

    fn ph(kind: &str, idx: u32, xfrm: &str) -> String {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{idx}" name="{kind} {idx}"/><p:cNvSpPr/><p:nvPr><p:ph type="{kind}" idx="{idx}"/></p:nvPr></p:nvSpPr><p:spPr>{xfrm}</p:spPr></p:sp>"#
        )
    }

    fn xfrm(x: i64, y: i64, cx: i64, cy: i64) -> String {
        format!(r#"<a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#)
    }

    #[test]
    fn test_layout_completed_from_master() {
        let master = extract_raw_shapes(&tree(&format!(
            "{}{}",
            ph("title", 0, &xfrm(1, 2, 3, 4)),
            ph("body", 1, &xfrm(10, 20, 30, 40))
        )))
        .unwrap();
        let master = PlaceholderMap::collect(&master, |_| None);

        // The layout's subtitle has no transform and takes the master body's.
        let layout = extract_raw_shapes(&tree(&format!(
            "{}{}",
            ph("ctrTitle", 0, &xfrm(5, 6, 7, 8)),
            ph("subTitle", 1, "")
        )))
        .unwrap();
        let layout = PlaceholderMap::collect(&layout, |p| master.by_master_kind(p));

        assert_eq!(
            layout.for_slide(&Placeholder::new("obj", 1)),
            Some(Geometry { left: 10, top: 20, width: 30, height: 40 })
        );
        assert_eq!(
            layout.for_slide(&Placeholder::new("ctrTitle", 0)),
            Some(Geometry { left: 5, top: 6, width: 7, height: 8 })
        );
    }

    #[test]
    fn test_slide_lookup_falls_back_to_type() {
        let layout = extract_raw_shapes(&tree(&ph("body", 1, &xfrm(10, 20, 30, 40)))).unwrap();
        let layout = PlaceholderMap::collect(&layout, |_| None);

        assert!(layout.for_slide(&Placeholder::new("body", 7)).is_some());
        assert!(layout.for_slide(&Placeholder::new("pic", 7)).is_none());
    }

    #[test]
    fn test_unresolved_placeholders_are_left_out() {
        let layout = extract_raw_shapes(&tree(&ph("body", 1, ""))).unwrap();
        let layout = PlaceholderMap::collect(&layout, |_| None);
        assert!(layout.for_slide(&Placeholder::new("body", 1)).is_none());
    }
}
