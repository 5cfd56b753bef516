
use crate::lifecycle::Phase;

#[test]
fn test_phase_order() {
    assert!(Phase::Uninitialized < Phase::OptionsResolved);
    assert!(Phase::OptionsResolved < Phase::Ready);
    assert!(Phase::Ready < Phase::AfterInitPackageLoad);
    assert_eq!(Phase::default(), Phase::Uninitialized);
}

#[test]
fn test_phase_next_and_display() {
    assert_eq!(Phase::Uninitialized.next(), Some(Phase::OptionsResolved));
    assert_eq!(Phase::Ready.next(), Some(Phase::AfterInitPackageLoad));
    assert_eq!(Phase::AfterInitPackageLoad.next(), None);
    assert_eq!(Phase::OptionsResolved.to_string(), "OptionsResolved");
}
