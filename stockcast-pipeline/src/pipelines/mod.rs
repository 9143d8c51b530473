pub mod sales_analysis;
