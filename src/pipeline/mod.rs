pub mod stage1_load;
pub mod stage2_simulate;
pub mod stage3_report;
