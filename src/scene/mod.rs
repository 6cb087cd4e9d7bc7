pub mod camera;
pub mod ray;
pub mod transform;

pub use camera::Camera;
pub use ray::Ray;
pub use transform::Transform;
