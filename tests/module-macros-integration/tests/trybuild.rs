//! trybuild 编译期测试

#[test]
fn trybuild_module_factory() {
    let t = trybuild::TestCases::new();
    t.pass("tests/trybuild/factory_ok.rs");
    t.compile_fail("tests/trybuild/factory_receiver.rs");
    t.compile_fail("tests/trybuild/factory_generic.rs");
}
