pub mod in_memory_source;
