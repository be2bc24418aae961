mod transform;

pub use transform::{
    euler_rotation, forward_from_euler, model_matrix, projection_matrix, view_matrix,
};
