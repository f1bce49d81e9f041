mod memory;
mod transfers;

pub use memory::MemoryTransferRepo;
pub use transfers::{DynTransferRepo, TransferRepo, TransferStoreError};
