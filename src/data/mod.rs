pub mod dataloader;
pub mod dataset;
pub mod image_folder;
