//! Per-client presentation scaling of snapshots
//!
//! The simulation always runs in the canonical 1280x720 space. Before a
//! snapshot is written to a socket it is scaled uniformly to fit the client's
//! reported window and the field is centered in whatever space is left over.
//! Nothing computed here ever flows back into the simulation.

use kickoff_shared::{
    CircleView, Rect, Snapshot, Vec2, Viewport, CANONICAL_HEIGHT, CANONICAL_WIDTH,
};

/// Uniform scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f32,
    pub offset: Vec2,
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform {
        scale: 1.0,
        offset: Vec2::ZERO,
    };

    /// Fits the canonical space into `viewport`, centering `field`.
    ///
    /// A viewport with a zero dimension cannot show anything and gets the
    /// identity transform.
    pub fn fit(viewport: Viewport, field: &Rect) -> Self {
        if viewport.width == 0 || viewport.height == 0 {
            return Self::IDENTITY;
        }

        let width = viewport.width as f32;
        let height = viewport.height as f32;
        let scale = (height / CANONICAL_HEIGHT).min(width / CANONICAL_WIDTH);

        let offset = Vec2::new(
            (width - field.width() * scale) / 2.0 - field.left * scale,
            (height - field.height() * scale) / 2.0 - field.top * scale,
        );

        Self { scale, offset }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn point(&self, point: Vec2) -> Vec2 {
        point * self.scale + self.offset
    }

    pub fn length(&self, length: f32) -> f32 {
        length * self.scale
    }

    pub fn rect(&self, rect: &Rect) -> Rect {
        let top_left = self.point(Vec2::new(rect.left, rect.top));
        let bottom_right = self.point(Vec2::new(rect.right, rect.bottom));
        Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
    }

    fn circle(&self, circle: &CircleView) -> CircleView {
        CircleView {
            position: self.point(circle.position),
            velocity: circle.velocity * self.scale,
            radius: self.length(circle.radius),
        }
    }
}

/// Returns a copy of `snapshot` as seen through `viewport`.
pub fn scale_snapshot(snapshot: &Snapshot, viewport: Viewport) -> Snapshot {
    let transform = ViewportTransform::fit(viewport, &snapshot.field);
    if transform.is_identity() {
        return snapshot.clone();
    }

    let mut scaled = snapshot.clone();
    scaled.field = transform.rect(&snapshot.field);
    scaled.player_area = transform.rect(&snapshot.player_area);
    scaled.ball = transform.circle(&snapshot.ball);
    for player in &mut scaled.players {
        player.body = transform.circle(&player.body);
    }
    for post in &mut scaled.posts {
        post.body = transform.circle(&post.body);
    }
    scaled
}
