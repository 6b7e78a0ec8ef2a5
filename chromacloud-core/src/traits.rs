//! Core traits for chromacloud

use crate::{point::*, point_cloud::*};

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object, `None` when there is nothing to draw
    fn bounding_box(&self) -> Option<(Point3f, Point3f)>;

    /// Get the center point of the object
    fn center(&self) -> Option<Point3f> {
        self.bounding_box().map(|(min, max)| nalgebra::center(&min, &max))
    }
}

impl Drawable for PointCloud<Point3f> {
    fn bounding_box(&self) -> Option<(Point3f, Point3f)> {
        let first = *self.points.first()?;
        let mut min = first;
        let mut max = first;

        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }
}
