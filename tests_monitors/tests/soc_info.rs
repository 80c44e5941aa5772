//! SoC Identification Integration Tests

use hal::MmioMapper;
use hal_imx27::memory_map::{IIM_BASE, PCCR0, PCCR0_IIM_EN, SYSCTRL_BASE};
use monitor_types::AttributeGroup;
use tests_monitors::test_bootstrap;

#[test]
fn test_dump_format() {
    let mut board = test_bootstrap();
    let info = board.load_soc_info();
    assert_eq!(
        info.show("internal_registers").unwrap(),
        "chip_id: 0x1882101D\n\
         product_rev: 0x2\n\
         silicon_rev: 0x21\n\
         suid: 0x0\n\
         mac_address: 0x5634129F0400\n"
    );
}

#[test]
fn test_every_region_released() {
    let mut board = test_bootstrap();
    board.load_soc_info();
    assert_eq!(board.memory.live_claims(), 0);
    assert_ne!(board.memory.peek(PCCR0) & PCCR0_IIM_EN, 0);
}

#[test]
fn test_held_region_only_zeroes_its_register() {
    let mut board = test_bootstrap();
    let held = board.memory.map(SYSCTRL_BASE, 4, "other driver").unwrap();
    let info = board.load_soc_info();
    drop(held);

    assert_eq!(info.value("chip_id"), Some(0));
    assert_eq!(info.value("silicon_rev"), Some(0x21));
}

#[test]
fn test_faulty_fuse_bank() {
    let mut board = test_bootstrap();
    board.memory.fail_access_at(IIM_BASE + 0x814);
    let info = board.load_soc_info();
    assert_eq!(info.value("mac_address"), Some(0));
    assert_eq!(info.value("chip_id"), Some(0x1882_101D));
}
