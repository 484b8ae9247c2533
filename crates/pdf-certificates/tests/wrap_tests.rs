use pdf_certificates::*;
use printpdf::BuiltinFont;

const SAMPLES: &[&str] = &[
    "Jonas Jonaitis",
    "Ana Marija Elena Birutė Jonaitytė-Petrauskienė",
    "Už puikų mokymąsi, aktyvų dalyvavimą olimpiadose ir konkursuose",
    "Supercalifragilisticexpialidocious is one long word",
    "a b c d e f g h i j k l m n o p q r s t u v w x y z",
    "   leading and trailing whitespace   ",
    "W",
];

const WIDTHS: &[f32] = &[40.0, 120.0, 250.0, 631.0];

fn faces() -> Vec<FontFace> {
    vec![
        FontFace::Builtin(BuiltinFont::Helvetica),
        FontFace::Builtin(BuiltinFont::HelveticaBold),
    ]
}

#[test]
fn test_lines_fit_unless_single_word() {
    for face in faces() {
        for text in SAMPLES {
            for &width in WIDTHS {
                for line in wrap_text(text, &face, 20.0, Some(width), None) {
                    let fits = face.text_width(&line, 20.0) <= width;
                    let lone_word = !line.contains(' ');
                    assert!(
                        fits || lone_word,
                        "{:?} at {}pt produced overflowing line {:?}",
                        text,
                        width,
                        line
                    );
                }
            }
        }
    }
}

#[test]
fn test_max_lines_is_respected() {
    let face = FontFace::Builtin(BuiltinFont::Helvetica);
    for text in SAMPLES {
        for &width in WIDTHS {
            for max_lines in 1..=3 {
                let lines = wrap_text(text, &face, 46.0, Some(width), Some(max_lines));
                assert!(lines.len() <= max_lines);
            }
        }
    }
}

#[test]
fn test_wrapping_keeps_every_word_in_order() {
    let face = FontFace::Builtin(BuiltinFont::Helvetica);
    for text in SAMPLES {
        let lines = wrap_text(text, &face, 46.0, Some(120.0), Some(2));
        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }
}

#[test]
fn test_wrapping_is_idempotent() {
    let face = FontFace::Builtin(BuiltinFont::Helvetica);
    for text in SAMPLES {
        for &width in WIDTHS {
            let first = wrap_text(text, &face, 20.0, Some(width), None);
            let second = wrap_text(&first.join(" "), &face, 20.0, Some(width), None);
            assert_eq!(first, second);
        }
    }
}

#[test]
fn test_surplus_lines_merge_into_last() {
    let face = FontFace::Builtin(BuiltinFont::Helvetica);
    let unbounded = wrap_text(SAMPLES[1], &face, 46.0, Some(120.0), None);
    let bounded = wrap_text(SAMPLES[1], &face, 46.0, Some(120.0), Some(2));

    assert!(unbounded.len() > 2);
    assert_eq!(bounded[0], unbounded[0]);
    assert_eq!(bounded[1], unbounded[1..].join(" "));
}
