pub mod dispatch_table;
