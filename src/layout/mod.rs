//! Row/column layout of widgets into block rectangles.
//!
//! A [`Layout`] is a tree of [`LayoutNode`]s solved with taffy's flexbox:
//! rows share their width equally between children, columns stack them,
//! and every widget is one unit tall. The solved rectangles are written
//! into the block as block-local widget rects.
//!
//! ```ignore
//! let ids = Layout::new(LayoutNode::column([
//!     LayoutNode::widget(Widget::button("Apply")),
//!     LayoutNode::group("axis", [x, y, z].map(LayoutNode::widget)),
//! ]))
//! .with_width(200.0)
//! .apply(&mut block)?;
//! ```

use taffy::prelude::{
    AvailableSpace, Dimension, FlexDirection, FromLength, LengthPercentage, NodeId, Style, TaffyAuto, TaffyTree,
};

use crate::block::{Block, WidgetId};
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::prefs::UiPreferences;
use crate::widget::Widget;

// ---------------------------------------------------------------------------
// LayoutNode
// ---------------------------------------------------------------------------

/// One node of a layout tree.
pub enum LayoutNode {
    Widget(Box<Widget>),
    Row(Vec<LayoutNode>),
    Column(Vec<LayoutNode>),
    /// A column whose widgets also form a named button group.
    Group(String, Vec<LayoutNode>),
}

impl LayoutNode {
    pub fn widget(widget: Widget) -> Self {
        LayoutNode::Widget(Box::new(widget))
    }

    pub fn row(children: impl IntoIterator<Item = LayoutNode>) -> Self {
        LayoutNode::Row(children.into_iter().collect())
    }

    pub fn column(children: impl IntoIterator<Item = LayoutNode>) -> Self {
        LayoutNode::Column(children.into_iter().collect())
    }

    pub fn group(name: impl Into<String>, children: impl IntoIterator<Item = LayoutNode>) -> Self {
        LayoutNode::Group(name.into(), children.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// A layout tree plus the metrics to solve it with.
pub struct Layout {
    root: LayoutNode,
    width: f32,
    unit: f32,
    gap: f32,
    origin: Point,
}

/// Which slot of the pending list a taffy leaf stands for.
type LeafContext = usize;

struct Pending {
    widgets: Vec<Widget>,
    /// Group name and the pending indices in it.
    groups: Vec<(String, Vec<usize>)>,
}

impl Layout {
    pub fn new(root: LayoutNode) -> Self {
        let prefs = UiPreferences::default();
        Self { root, width: prefs.unit_y() * 10.0, unit: prefs.unit_y(), gap: 0.0, origin: Point::ZERO }
    }

    /// Width and unit height taken from `prefs`.
    pub fn for_prefs(root: LayoutNode, prefs: &UiPreferences) -> Self {
        Self::new(root).with_unit(prefs.unit_y()).with_width(prefs.unit_y() * 10.0)
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Height of one widget.
    pub fn with_unit(mut self, unit: f32) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    /// Block-space position of the top-left corner.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Solve the layout and add its widgets to `block`, in tree order.
    pub fn apply(self, block: &mut Block) -> Result<Vec<WidgetId>> {
        let Layout { root, width, unit, gap, origin } = self;
        let metrics = Metrics { unit, gap };
        let mut tree: TaffyTree<LeafContext> = TaffyTree::new();
        let mut pending = Pending { widgets: Vec::new(), groups: Vec::new() };
        let root = metrics.build(&mut tree, root, FlexDirection::Column, &mut pending)?;

        let mut style = tree.style(root)?.clone();
        style.size.width = Dimension::from_length(width);
        tree.set_style(root, style)?;
        tree.compute_layout(
            root,
            taffy::geometry::Size { width: AvailableSpace::Definite(width), height: AvailableSpace::MaxContent },
        )?;

        let mut rects = vec![Rect::EMPTY; pending.widgets.len()];
        place(&tree, root, origin, &mut rects)?;

        let ids: Vec<WidgetId> = pending
            .widgets
            .into_iter()
            .zip(rects)
            .map(|(w, rect)| block.add(w.with_rect(rect)))
            .collect();
        for (name, members) in pending.groups {
            block.group(name, members.into_iter().map(|i| ids[i]).collect());
        }
        Ok(ids)
    }
}

struct Metrics {
    unit: f32,
    gap: f32,
}

impl Metrics {
    /// Children of a row share its width; children of a column keep their
    /// natural height.
    fn item_style(parent: FlexDirection) -> Style {
        match parent {
            FlexDirection::Row | FlexDirection::RowReverse => Style {
                flex_grow: 1.0,
                flex_shrink: 1.0,
                flex_basis: Dimension::from_length(0.0),
                ..Default::default()
            },
            _ => Style::default(),
        }
    }

    fn build(
        &self,
        tree: &mut TaffyTree<LeafContext>,
        node: LayoutNode,
        parent: FlexDirection,
        pending: &mut Pending,
    ) -> Result<NodeId> {
        let mut style = Self::item_style(parent);
        let (direction, children, group) = match node {
            LayoutNode::Widget(w) => {
                style.size = taffy::geometry::Size { width: Dimension::AUTO, height: Dimension::from_length(self.unit) };
                pending.widgets.push(*w);
                return Ok(tree.new_leaf_with_context(style, pending.widgets.len() - 1)?);
            }
            LayoutNode::Row(children) => (FlexDirection::Row, children, None),
            LayoutNode::Column(children) => (FlexDirection::Column, children, None),
            LayoutNode::Group(name, children) => (FlexDirection::Column, children, Some(name)),
        };
        let first = pending.widgets.len();
        let ids = children
            .into_iter()
            .map(|c| self.build(tree, c, direction, pending))
            .collect::<Result<Vec<_>>>()?;
        if let Some(name) = group {
            pending.groups.push((name, (first..pending.widgets.len()).collect()));
        }
        style.flex_direction = direction;
        style.gap = taffy::geometry::Size {
            width: LengthPercentage::from_length(self.gap),
            height: LengthPercentage::from_length(self.gap),
        };
        Ok(tree.new_with_children(style, &ids)?)
    }
}

/// Write absolute rects of every leaf under `node`.
fn place(tree: &TaffyTree<LeafContext>, node: NodeId, parent: Point, out: &mut [Rect]) -> Result<()> {
    let layout = tree.layout(node)?;
    let origin = parent + Point::new(layout.location.x, layout.location.y);
    if let Some(&i) = tree.get_node_context(node) {
        if let Some(slot) = out.get_mut(i) {
            *slot = Rect::new(origin.x, origin.y, layout.size.width, layout.size.height);
        }
    }
    for child in tree.children(node)? {
        place(tree, child, origin, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;

    fn button(label: &str) -> LayoutNode {
        LayoutNode::widget(Widget::new(WidgetKind::Button, label))
    }

    fn rect_of(block: &Block, label: &str) -> Rect {
        block.find_by_label(label).map(|id| block[id].rect).unwrap()
    }

    // ── Rows and columns ─────────────────────────────────────────────

    #[test]
    fn row_shares_width_equally() {
        let mut block = Block::new("row");
        Layout::new(LayoutNode::row([button("A"), button("B")])).with_width(100.0).with_unit(20.0).apply(&mut block).unwrap();
        assert_eq!(rect_of(&block, "A"), Rect::new(0.0, 0.0, 50.0, 20.0));
        assert_eq!(rect_of(&block, "B"), Rect::new(50.0, 0.0, 50.0, 20.0));
        assert_eq!(block.rect, Rect::new(0.0, 0.0, 100.0, 20.0));
    }

    #[test]
    fn column_stacks_rows() {
        let mut block = Block::new("col");
        Layout::new(LayoutNode::column([button("A"), LayoutNode::row([button("B"), button("C")])]))
            .with_width(80.0)
            .with_unit(20.0)
            .with_origin(Point::new(10.0, 5.0))
            .apply(&mut block)
            .unwrap();
        assert_eq!(rect_of(&block, "A"), Rect::new(10.0, 5.0, 80.0, 20.0));
        assert_eq!(rect_of(&block, "C"), Rect::new(50.0, 25.0, 40.0, 20.0));
    }

    // ── Groups ───────────────────────────────────────────────────────

    #[test]
    fn group_registers_its_widgets() {
        let mut block = Block::new("axes");
        let ids = Layout::new(LayoutNode::column([
            button("Reset"),
            LayoutNode::group("axis", [button("X"), button("Y")]),
        ]))
        .apply(&mut block)
        .unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(block.groups.len(), 1);
        assert_eq!(block.groups[0].name, "axis");
        assert_eq!(block.groups[0].widgets, ids[1..].to_vec());
    }
}
