//! Route map rendering.
//!
//! [`MapRenderer`] turns a [`Projection`] into a [`Drawing`]: a list of
//! vector primitives plus the viewport they are shown through. Drawings
//! serialize to SVG, so the output stays resolution independent and can be
//! embedded straight into a page.
//!
//! The drawing surface grows y downward, so projected rows are flipped with
//! `height - y` before anything is placed.

use std::fmt;

use crate::projection::{ProjectedPoint, Projection};
use crate::route::angle;

/// Offset added to the heading when the map follows the user, so that the
/// direction of travel points to the top of the viewport.
pub const HEADING_ROTATION_OFFSET: f64 = 270.0;

/// Distance between direction arrows, in multiples of the subsample chunk.
pub const ARROW_SPACING_FACTOR: usize = 20;

/// Options controlling how a map is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Only every `subsample_chunk`-th projected point is drawn.
    pub subsample_chunk: usize,
    /// Radius of the start, finish and user circles. Arrows are twice as wide.
    pub marker_radius: i32,
    /// Center the viewport on the user instead of showing the whole route.
    pub follow_user: bool,
    /// Rotate the map with the heading while following the user.
    pub rotate_with_heading: bool,
    /// Horizontal half-extent of the follow-user viewport.
    pub padding_x: i32,
    /// Vertical half-extent of the follow-user viewport.
    pub padding_y: i32,
    /// Image used for direction arrows.
    pub arrow_href: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            subsample_chunk: 5,
            marker_radius: 10,
            follow_user: false,
            rotate_with_heading: true,
            padding_x: 600,
            padding_y: 600,
            arrow_href: "assets/arrow_s.png".to_string(),
        }
    }
}

/// Kind of circular marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Start,
    Finish,
    User,
}

impl Marker {
    pub fn fill(&self) -> &'static str {
        match self {
            Marker::Start => "blue",
            Marker::Finish => "red",
            Marker::User => "green",
        }
    }
}

/// A single drawing instruction, in surface (y-down) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Circle {
        x: i32,
        y: i32,
        radius: i32,
        marker: Marker,
    },
    Polyline {
        points: Vec<(i32, i32)>,
    },
    /// Direction arrow anchored at `(x, y)`, rotated by `-angle` degrees.
    Arrow {
        x: i32,
        y: i32,
        size: i32,
        angle: f64,
    },
}

/// Visible region of the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Rotation of the whole drawing about a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub degrees: f64,
    pub cx: i32,
    pub cy: i32,
}

/// A composed route map.
#[derive(Debug, Clone)]
pub struct Drawing {
    view_box: ViewBox,
    rotation: Option<Rotation>,
    primitives: Vec<Primitive>,
    arrow_href: String,
}

impl Drawing {
    pub fn view_box(&self) -> ViewBox {
        self.view_box
    }

    pub fn rotation(&self) -> Option<Rotation> {
        self.rotation
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Serialize the drawing as an SVG document.
    pub fn to_svg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Drawing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vb = self.view_box;
        writeln!(
            f,
            r#"<svg width="100%" height="100%" viewBox="{} {} {} {}" preserveAspectRatio="xMinYMin meet" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
            vb.x, vb.y, vb.width, vb.height
        )?;

        match self.rotation {
            Some(r) => writeln!(f, "{}", group_open(r))?,
            None => writeln!(f, "<g>")?,
        }

        for primitive in &self.primitives {
            match primitive {
                Primitive::Circle {
                    x,
                    y,
                    radius,
                    marker,
                } => writeln!(
                    f,
                    r#"<circle cx="{x}" cy="{y}" r="{radius}" style="fill:{}"/>"#,
                    marker.fill()
                )?,
                Primitive::Polyline { points } => {
                    write!(f, r#"<polyline points=""#)?;
                    for (i, (x, y)) in points.iter().enumerate() {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{x},{y}")?;
                    }
                    writeln!(f, r#"" style="fill:none;stroke-width:2;stroke:black"/>"#)?;
                }
                Primitive::Arrow { x, y, size, angle } => writeln!(
                    f,
                    r#"<image x="{}" y="{}" width="{size}" height="{size}" xlink:href="{}" transform="rotate({:.6}, {x}, {y})"/>"#,
                    x - size,
                    y - size / 2,
                    self.arrow_href,
                    -angle
                )?,
            }
        }

        writeln!(f, "</g>")?;
        write!(f, "</svg>")
    }
}

fn group_open(r: Rotation) -> String {
    format!(
        r#"<g transform="rotate({:.6}, {}, {})">"#,
        r.degrees, r.cx, r.cy
    )
}

/// Composes projected tracks into drawings.
#[derive(Debug, Clone, Default)]
pub struct MapRenderer {
    options: RenderOptions,
}

impl MapRenderer {
    pub fn new(mut options: RenderOptions) -> Self {
        options.subsample_chunk = options.subsample_chunk.max(1);
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a projected track.
    ///
    /// `heading` is the user's direction of travel in degrees, as returned
    /// by [`crate::Route::direction`].
    ///
    /// Returns `None` when there is nothing to draw (no projected points).
    pub fn render(&self, projection: &Projection, heading: f64) -> Option<Drawing> {
        let opts = &self.options;
        let chunk = opts.subsample_chunk;
        let height = projection.height;

        let flip = |p: &ProjectedPoint| (p.x, height - p.y);

        let route: Vec<(i32, i32)> = projection.points.iter().step_by(chunk).map(flip).collect();

        let (&(start_x, start_y), &(end_x, end_y)) = (route.first()?, route.last()?);
        let user = projection.user.as_ref().map(flip);

        let mut primitives = Vec::with_capacity(4 + route.len() / (chunk * ARROW_SPACING_FACTOR));

        primitives.push(Primitive::Circle {
            x: start_x,
            y: start_y,
            radius: opts.marker_radius,
            marker: Marker::Start,
        });
        primitives.push(Primitive::Polyline {
            points: route.clone(),
        });

        let spacing = chunk * ARROW_SPACING_FACTOR;
        for i in (spacing..route.len()).step_by(spacing) {
            let (prev_x, prev_y) = route[i - chunk];
            let (x, y) = route[i];
            primitives.push(Primitive::Arrow {
                x,
                y,
                size: opts.marker_radius * 2,
                angle: angle(prev_x, prev_y, x, y),
            });
        }

        primitives.push(Primitive::Circle {
            x: end_x,
            y: end_y,
            radius: opts.marker_radius,
            marker: Marker::Finish,
        });

        if let Some((x, y)) = user {
            tracing::trace!(x, y, heading, "Drawing user marker");
            primitives.push(Primitive::Circle {
                x,
                y,
                radius: opts.marker_radius,
                marker: Marker::User,
            });
        }

        let following = user.filter(|_| opts.follow_user);

        let view_box = match following {
            Some((x, y)) => ViewBox {
                x: x - opts.padding_x,
                y: y - opts.padding_y,
                width: 2 * opts.padding_x,
                height: 2 * opts.padding_y,
            },
            None => ViewBox {
                x: 0,
                y: 0,
                width: projection.width,
                height,
            },
        };

        let rotation = following
            .filter(|_| opts.rotate_with_heading)
            .map(|(cx, cy)| Rotation {
                degrees: heading + HEADING_ROTATION_OFFSET,
                cx,
                cy,
            });

        Some(Drawing {
            view_box,
            rotation,
            primitives,
            arrow_href: opts.arrow_href.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{project_track, BoundingBox, Resolution};
    use crate::route::Location;
    use crate::track::TrackPoint;

    /// A straight track heading north-east, one point per 0.0001°.
    fn diagonal_track(n: usize) -> Vec<TrackPoint> {
        (0..n)
            .map(|i| {
                let step = i as f64 * 0.0001;
                TrackPoint::new(54.0 + step, 25.0 + step, 0.0)
            })
            .collect()
    }

    fn arrows(drawing: &Drawing) -> Vec<&Primitive> {
        drawing
            .primitives()
            .iter()
            .filter(|p| matches!(p, Primitive::Arrow { .. }))
            .collect()
    }

    #[test]
    fn test_nothing_to_draw() {
        let projection = Projection {
            points: vec![],
            user: None,
            bounds: BoundingBox {
                min_lat: 0.0,
                max_lat: 0.0,
                min_lon: 0.0,
                max_lon: 0.0,
            },
            width: 0,
            height: 0,
        };
        assert!(MapRenderer::default().render(&projection, 0.0).is_none());
    }

    #[test]
    fn test_single_point_track() {
        let projection =
            project_track(&[TrackPoint::new(1.0, 1.0, 0.0)], None, Resolution::Coarse).unwrap();
        let drawing = MapRenderer::default().render(&projection, 0.0).unwrap();

        assert_eq!(drawing.primitives().len(), 3);
        assert_eq!(
            drawing.view_box(),
            ViewBox {
                x: 0,
                y: 0,
                width: 0,
                height: 0
            }
        );
    }

    #[test]
    fn test_full_route_layout() {
        let projection = project_track(&diagonal_track(11), None, Resolution::Coarse).unwrap();
        let drawing = MapRenderer::default().render(&projection, 0.0).unwrap();

        // Subsampled indices 0, 5, 10; y flipped so north is up
        let expected_route = vec![(0, 10), (5, 5), (10, 0)];
        assert_eq!(
            drawing.primitives(),
            &[
                Primitive::Circle {
                    x: 0,
                    y: 10,
                    radius: 10,
                    marker: Marker::Start,
                },
                Primitive::Polyline {
                    points: expected_route,
                },
                Primitive::Circle {
                    x: 10,
                    y: 0,
                    radius: 10,
                    marker: Marker::Finish,
                },
            ]
        );
        assert_eq!(
            drawing.view_box(),
            ViewBox {
                x: 0,
                y: 0,
                width: 10,
                height: 10
            }
        );
        assert!(drawing.rotation().is_none());
    }

    #[test]
    fn test_direction_arrows() {
        // 1001 points -> 201 subsampled -> arrows at subsampled 100 and 200
        let projection = project_track(&diagonal_track(1001), None, Resolution::Coarse).unwrap();
        let drawing = MapRenderer::default().render(&projection, 0.0).unwrap();

        let arrows = arrows(&drawing);
        assert_eq!(arrows.len(), 2);
        match arrows[0] {
            Primitive::Arrow { x, y, size, angle } => {
                assert_eq!((*x, *y), (500, 500));
                assert_eq!(*size, 20);
                // Moving right and up the surface
                assert!((angle - 45.0).abs() < 1e-9);
            }
            other => panic!("expected arrow, got {other:?}"),
        }
    }

    #[test]
    fn test_no_arrows_on_short_track() {
        let projection = project_track(&diagonal_track(400), None, Resolution::Coarse).unwrap();
        let drawing = MapRenderer::default().render(&projection, 0.0).unwrap();
        assert!(arrows(&drawing).is_empty());
    }

    #[test]
    fn test_user_marker_and_follow_viewport() {
        let user = Location::new(25.0005, 54.0005).unwrap();
        let projection =
            project_track(&diagonal_track(11), Some(&user), Resolution::Coarse).unwrap();

        let renderer = MapRenderer::new(RenderOptions {
            follow_user: true,
            ..RenderOptions::default()
        });
        let drawing = renderer.render(&projection, 90.0).unwrap();

        assert_eq!(
            drawing.primitives().last(),
            Some(&Primitive::Circle {
                x: 5,
                y: 5,
                radius: 10,
                marker: Marker::User,
            })
        );
        assert_eq!(
            drawing.view_box(),
            ViewBox {
                x: -595,
                y: -595,
                width: 1200,
                height: 1200
            }
        );
        assert_eq!(
            drawing.rotation(),
            Some(Rotation {
                degrees: 360.0,
                cx: 5,
                cy: 5
            })
        );
    }

    #[test]
    fn test_follow_without_user_falls_back() {
        let projection = project_track(&diagonal_track(11), None, Resolution::Coarse).unwrap();
        let renderer = MapRenderer::new(RenderOptions {
            follow_user: true,
            ..RenderOptions::default()
        });
        let drawing = renderer.render(&projection, 45.0).unwrap();

        assert_eq!(drawing.view_box().x, 0);
        assert_eq!(drawing.view_box().width, 10);
        assert!(drawing.rotation().is_none());
    }

    #[test]
    fn test_follow_without_rotation() {
        let user = Location::new(25.0005, 54.0005).unwrap();
        let projection =
            project_track(&diagonal_track(11), Some(&user), Resolution::Coarse).unwrap();
        let renderer = MapRenderer::new(RenderOptions {
            follow_user: true,
            rotate_with_heading: false,
            ..RenderOptions::default()
        });
        let drawing = renderer.render(&projection, 45.0).unwrap();
        assert!(drawing.rotation().is_none());
        assert_eq!(drawing.view_box().width, 1200);
    }

    #[test]
    fn test_zero_subsample_chunk_clamped() {
        let renderer = MapRenderer::new(RenderOptions {
            subsample_chunk: 0,
            ..RenderOptions::default()
        });
        assert_eq!(renderer.options().subsample_chunk, 1);
    }

    #[test]
    fn test_svg_output() {
        let user = Location::new(25.0005, 54.0005).unwrap();
        let projection =
            project_track(&diagonal_track(1001), Some(&user), Resolution::Coarse).unwrap();
        let renderer = MapRenderer::new(RenderOptions {
            follow_user: true,
            ..RenderOptions::default()
        });
        let svg = renderer.render(&projection, 10.0).unwrap().to_svg();

        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"viewBox="-595 395 1200 1200""#));
        assert!(svg.contains(r#"<g transform="rotate(280.000000, 5, 995)">"#));
        assert!(svg.contains(r#"<circle cx="0" cy="1000" r="10" style="fill:blue"/>"#));
        assert!(svg.contains(r#"style="fill:red""#));
        assert!(svg.contains(r#"style="fill:green""#));
        assert!(svg.contains(r#"<polyline points="0,1000 5,995 "#));
        assert!(svg.contains(r#"xlink:href="assets/arrow_s.png""#));
        assert!(svg.contains(r#"transform="rotate(-45.000000, 500, 500)""#));
        assert_eq!(svg.matches("<image ").count(), 2);
    }
}
