mod sanitize_test;
mod storage_path_test;
