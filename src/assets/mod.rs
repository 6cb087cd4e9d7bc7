pub mod io;
pub mod loader;
pub mod loaders;
pub mod model;

pub use io::{AssetReader, MemoryAssetReader};
#[cfg(not(target_arch = "wasm32"))]
pub use io::FileAssetReader;
pub use loader::ModelLoader;
#[cfg(feature = "gltf")]
pub use loaders::GltfLoader;
pub use model::{Aabb, LoadedModel, MaterialTag, ModelFraming, ModelHierarchy, ModelNode, Renderable};
