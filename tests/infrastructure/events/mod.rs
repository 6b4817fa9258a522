mod codec_test;
mod in_memory_store_test;
