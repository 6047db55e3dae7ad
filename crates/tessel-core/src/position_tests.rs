use crate::{InputEdit, Length, Point};

#[test]
fn length_of_multiline_text() {
    let len = Length::of_text(b"ab\ncde\nf");
    assert_eq!(len.bytes, 8);
    assert_eq!(len.extent, Point::new(2, 1));
}

#[test]
fn add_and_sub_are_inverse() {
    let a = Length::of_text(b"label start:\n    ");
    let b = Length::of_text(b"\"hi\"\n");
    let sum = a + b;
    assert_eq!(sum, Length::of_text(b"label start:\n    \"hi\"\n"));
    assert_eq!(sum - a, b);
    assert_eq!(sum - b - a, Length::ZERO);
}

#[test]
fn add_on_same_row_advances_column() {
    let sum = Length::of_text(b"1+") + Length::of_text(b"23");
    assert_eq!(sum.extent, Point::new(0, 4));
}

#[test]
fn replace_builds_points() {
    let edit = InputEdit::replace("a\nbc\n", 3, 4, "xyz\nw");
    assert_eq!(edit.start_byte, 3);
    assert_eq!(edit.old_end_byte, 4);
    assert_eq!(edit.new_end_byte, 8);
    assert_eq!(edit.start_position, Point::new(1, 1));
    assert_eq!(edit.old_end_position, Point::new(1, 2));
    assert_eq!(edit.new_end_position, Point::new(2, 1));
    assert_eq!(edit.apply("a\nbc\n", "xyz\nw"), "a\nbxyz\nw\n");
}

#[test]
fn map_shifts_collapses_and_keeps() {
    let old = "1+2*3";
    let edit = InputEdit::replace(old, 2, 3, "23");
    let at = |offset| Length::at_offset(old.as_bytes(), offset);

    assert_eq!(edit.map(at(1)).bytes, 1);
    assert_eq!(edit.map(at(2)).bytes, 2);
    assert_eq!(edit.map(at(3)).bytes, 4);
    assert_eq!(edit.map(at(5)).bytes, 6);
    assert_eq!(edit.map(at(5)).extent, Point::new(0, 6));
}

#[test]
fn map_deletion_collapses_inside() {
    let edit = InputEdit::replace("abcdef", 1, 5, "");
    assert_eq!(edit.map(Length::at_offset(b"abcdef", 3)).bytes, 1);
    assert_eq!(edit.map(Length::at_offset(b"abcdef", 6)).bytes, 2);
}
