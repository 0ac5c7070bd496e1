pub mod method_set;
