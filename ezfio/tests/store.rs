#![allow(missing_docs)]

use std::{error::Error, io::Read, path::Path};

use ezfio::{
    array::reshape,
    codec::CodecError,
    storage::{RecordKey, StorageError},
    Array, Ezfio, EzfioError, Nested, RecordKind, Scalar, Value,
};
use flate2::read::GzDecoder;

fn read_gzip_text(path: &Path) -> Result<String, Box<dyn Error>> {
    let mut text = String::new();
    GzDecoder::new(std::fs::File::open(path)?).read_to_string(&mut text)?;
    Ok(text)
}

fn sample_elements(kind: RecordKind, count: usize) -> Vec<Scalar> {
    (0..count)
        .map(|i| {
            let i = i32::try_from(i).unwrap();
            match kind {
                RecordKind::Integer => Scalar::Integer(i - 2),
                RecordKind::Integer64 => Scalar::Integer64((i64::from(i) << 35) - 1),
                RecordKind::Double => Scalar::Double(f64::from(i) * 0.25 - 0.5),
                RecordKind::Logical => Scalar::Logical(i % 3 == 0),
                RecordKind::Character => Scalar::Character(format!("X{i}")),
            }
        })
        .collect()
}

#[test]
#[cfg_attr(miri, ignore)]
fn scalar_round_trip() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let ezfio = Ezfio::open(path.path())?;
    for (name, value) in [
        ("integer", Scalar::Integer(42)),
        ("integer64", Scalar::Integer64(1 << 40)),
        ("double", Scalar::Double(3.141_592_653_589_79)),
        ("logical", Scalar::Logical(true)),
        ("character", Scalar::from("Mu")),
    ] {
        let key = RecordKey::new("test", name)?;
        ezfio.write_scalar(&key, value.kind(), value.clone())?;
        assert_eq!(ezfio.read_scalar(&key, value.kind())?, value);
    }
    assert_eq!(
        std::fs::read_to_string(path.path().join("test/double"))?,
        "   3.141592653589790E+00\n"
    );
    assert_eq!(
        std::fs::read_to_string(path.path().join("test/integer"))?,
        "                  42\n"
    );
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn array_round_trip() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let ezfio = Ezfio::open(path.path())?;
    for kind in RecordKind::ALL {
        for shape in [vec![3], vec![2, 3]] {
            let key = RecordKey::new("test", format!("{}_{}", kind.abbreviation(), shape.len()))?;
            let elements = sample_elements(kind, shape.iter().product());
            let nested = reshape(elements.clone(), &shape);
            let array = Array::from_nested(kind, shape.clone(), nested.clone())?;
            ezfio.write_array(&key, &array)?;

            let read = ezfio.read_array(&key, kind, &shape)?;
            assert_eq!(read.shape(), shape.as_slice());
            assert_eq!(read.elements(), elements.as_slice());
            assert_eq!(Nested::from(read), nested);

            let text = read_gzip_text(&path.path().join("test").join(key.array_file_name()))?;
            let mut lines = text.lines();
            assert_eq!(lines.next().map(str::trim), Some(shape.len().to_string().as_str()));
            let extents: Vec<usize> = lines
                .next()
                .unwrap_or_default()
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()?;
            assert_eq!(extents, shape);
            assert_eq!(lines.count(), elements.len());
        }
    }
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn array_element_order() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let ezfio = Ezfio::open(path.path())?;
    let nested: Nested = [[1, 2], [3, 4], [5, 6]]
        .into_iter()
        .map(Nested::from_iter)
        .collect();
    let array = Array::from_nested(RecordKind::Integer, vec![2, 3], nested)?;
    assert_eq!(array.get(&[1, 0]), Some(&Scalar::Integer(2)));
    assert_eq!(array.get(&[0, 1]), Some(&Scalar::Integer(3)));

    let key = RecordKey::new("test", "order")?;
    ezfio.write_array(&key, &array)?;
    let text = read_gzip_text(&path.path().join("test/order.gz"))?;
    let payload: Vec<i32> = text
        .lines()
        .skip(2)
        .map(|line| line.trim().parse())
        .collect::<Result<_, _>>()?;
    assert_eq!(payload, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(
        text.lines().nth(1),
        Some("                   2                    3 ")
    );
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn missing_record() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let ezfio = Ezfio::open(path.path())?;
    let key = RecordKey::new("nuclei", "nucl_num")?;
    assert!(matches!(
        ezfio.read_scalar(&key, RecordKind::Integer),
        Err(EzfioError::RecordNotSet(_))
    ));
    assert!(matches!(
        ezfio.read_array(&key, RecordKind::Integer, &[1]),
        Err(EzfioError::RecordNotSet(_))
    ));
    assert!(!ezfio.has("nuclei_nucl_num")?);
    assert!(!ezfio.has("nuclei_nucl_coord")?);
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn read_only() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let ezfio = Ezfio::open(path.path())?;
    ezfio.set("nuclei_nucl_num", 1)?;
    let before: Vec<_> = walk(path.path())?;

    ezfio.set_read_only(true);
    let key = RecordKey::new("nuclei", "nucl_num")?;
    let array = Array::new(RecordKind::Double, vec![1], vec![1.0.into()])?;
    assert!(matches!(
        ezfio.write_scalar(&key, RecordKind::Integer, 2.into()),
        Err(EzfioError::StorageError(StorageError::ReadOnly))
    ));
    assert!(matches!(
        ezfio.write_array(&RecordKey::new("nuclei", "nucl_charge")?, &array),
        Err(EzfioError::StorageError(StorageError::ReadOnly))
    ));
    assert!(matches!(
        ezfio.set("jastrow_j2e_type", "Mu"),
        Err(EzfioError::StorageError(StorageError::ReadOnly))
    ));
    assert!(matches!(
        ezfio.section_path("ao_basis"),
        Err(StorageError::ReadOnly)
    ));
    assert_eq!(walk(path.path())?, before);

    // Reads are still allowed.
    assert_eq!(ezfio.get_as::<i32>("nuclei_nucl_num")?, 1);
    ezfio.set_read_only(false);
    ezfio.set("nuclei_nucl_num", 2)?;
    Ok(())
}

fn walk(root: &Path) -> Result<Vec<(String, Vec<u8>)>, Box<dyn Error>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let contents = if entry.file_type().is_file() {
            std::fs::read(entry.path())?
        } else {
            Vec::new()
        };
        files.push((entry.path().display().to_string(), contents));
    }
    Ok(files)
}

#[test]
#[cfg_attr(miri, ignore)]
fn shape_mismatch() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let ezfio = Ezfio::open(path.path())?;
    let key = RecordKey::new("test", "matrix")?;
    let array = Array::new(
        RecordKind::Double,
        vec![2, 3],
        sample_elements(RecordKind::Double, 6),
    )?;
    ezfio.write_array(&key, &array)?;
    assert!(matches!(
        ezfio.read_array(&key, RecordKind::Double, &[3, 2]),
        Err(EzfioError::CodecError(CodecError::ShapeMismatch(_, _)))
    ));
    assert!(matches!(
        ezfio.read_array(&key, RecordKind::Double, &[6]),
        Err(EzfioError::CodecError(CodecError::RankMismatch(2, 1)))
    ));
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn governing_dimension() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let ezfio = Ezfio::open(path.path())?;
    ezfio.set("nuclei_nucl_num", 2)?;
    ezfio.set("nuclei_nucl_coord", Nested::from_iter([0.0, 0.0, 0.0, 0.0, 0.0, 1.4]))?;
    assert_eq!(ezfio.get_as::<Array>("nuclei_nucl_coord")?.shape(), &[2, 3]);

    ezfio.set("nuclei_nucl_num", 3)?;
    assert!(matches!(
        ezfio.get("nuclei_nucl_coord"),
        Err(EzfioError::CodecError(CodecError::ShapeMismatch(_, _)))
    ));
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn derived_variable() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let ezfio = Ezfio::open(path.path())?;
    ezfio.set("ao_basis_ao_num", 3)?;
    ezfio.set("ao_basis_ao_prim_num", Nested::from_iter([3, 1, 5]))?;
    assert_eq!(ezfio.get("ao_basis_ao_prim_num_max")?, Value::from(5));
    assert!(matches!(
        ezfio.set("ao_basis_ao_prim_num_max", 6),
        Err(EzfioError::NotWritable(_))
    ));
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn root_initialisation() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let root = path.path().join("fresh.ezfio");
    let ezfio = Ezfio::new();
    assert!(matches!(
        ezfio.get("ezfio_creation"),
        Err(EzfioError::StorageError(StorageError::NotBound))
    ));
    ezfio.set_file(&root)?;
    for file in [
        ".version",
        "ezfio/.version",
        "ezfio/creation",
        "ezfio/user",
        "ezfio/library",
    ] {
        assert!(root.join(file).is_file(), "{file} is missing");
    }
    assert_eq!(std::fs::read_to_string(root.join(".version"))?, "2.0.7\n");
    assert!(ezfio.has("ezfio_creation")?);
    assert!(!ezfio.has("ezfio_last_library")?);
    ezfio.set("ezfio_last_library", "ezfio-rs")?;
    assert_eq!(ezfio.get_as::<String>("ezfio_last_library")?, "ezfio-rs");
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn existing_fortran_store() -> Result<(), Box<dyn Error>> {
    // A store as written by the Fortran library: two nuclei, `D` exponents and padded logicals.
    let path = tempfile::TempDir::new()?;
    let root = path.path();
    for dir in [root.to_path_buf(), root.join("nuclei"), root.join("jastrow")] {
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(".version"), "2.0.7\n")?;
    }
    std::fs::write(root.join("nuclei/nucl_num"), "           2\n")?;
    std::fs::write(root.join("jastrow/inv_sgn_jast"), " T\n")?;
    std::fs::write(root.join("jastrow/a_boys"), "  0.1000000000000000D+01\n")?;
    let text = "  1\n                   2 \n   8.000000000000000E+00\n   1.000000000000000E+00\n";
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    std::io::Write::write_all(&mut encoder, text.as_bytes())?;
    std::fs::write(root.join("nuclei/nucl_charge.gz"), encoder.finish()?)?;

    let ezfio = Ezfio::open(root)?;
    assert!(!root.join("ezfio").exists());
    assert_eq!(ezfio.get_as::<i32>("nuclei_nucl_num")?, 2);
    assert!(ezfio.get_as::<bool>("jastrow_inv_sgn_jast")?);
    assert_eq!(ezfio.get_as::<f64>("jastrow_a_boys")?, 1.0);
    let charge = ezfio.get_as::<Array>("nuclei_nucl_charge")?;
    assert_eq!(charge.elements(), &[Scalar::Double(8.0), Scalar::Double(1.0)]);
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn character_line_breaks_rejected() -> Result<(), Box<dyn Error>> {
    let path = tempfile::TempDir::new()?;
    let ezfio = Ezfio::open(path.path())?;
    ezfio.set("jastrow_j2e_type", "Mu")?;
    assert!(matches!(
        ezfio.set("jastrow_j2e_type", "Jastrow\nBoys"),
        Err(EzfioError::KindMismatch(_))
    ));
    assert_eq!(ezfio.get_as::<String>("jastrow_j2e_type")?, "Mu");

    ezfio.set("nuclei_nucl_num", 2)?;
    assert!(matches!(
        ezfio.set("nuclei_nucl_label", Nested::from_iter(["O\nH", "C"])),
        Err(EzfioError::KindMismatch(_))
    ));
    assert!(!ezfio.has("nuclei_nucl_label")?);
    Ok(())
}

#[test]
#[cfg(unix)]
#[cfg_attr(miri, ignore)]
fn record_permissions() -> Result<(), Box<dyn Error>> {
    use std::os::unix::fs::PermissionsExt;

    let path = tempfile::TempDir::new()?;
    let root = path.path().join("h2.ezfio");
    let ezfio = Ezfio::open(&root)?;
    ezfio.set("jastrow_j2e_type", "Mu")?;
    let plain = path.path().join("plain");
    std::fs::write(&plain, "Mu\n")?;
    let expected = std::fs::metadata(&plain)?.permissions().mode() & 0o777;
    for file in [".version", "ezfio/.version", "ezfio/creation", "jastrow/j2e_type"] {
        let mode = std::fs::metadata(root.join(file))?.permissions().mode() & 0o777;
        assert_eq!(mode, expected, "{file}");
    }
    Ok(())
}
