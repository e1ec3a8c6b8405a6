use embedded_io::{ErrorKind, Read, Seek, SeekFrom, Write};
use four_io::FourFile;
use fourdev::{Device, Message, CAPACITY};

#[test]
fn happy_path() {
    let device = Device::new().expect("Should create device");
    let mut file = FourFile::open(&device);

    assert_eq!(file.write(b"foo").unwrap(), 3);
    file.rewind().expect("Should seek to start");

    let mut buf = [0u8; 10];
    let n = file.read(&mut buf).expect("Should read content");
    assert_eq!(&buf[..n], b"foo");

    // EOF
    let n = file.read(&mut buf).expect("EOF is not an error");
    assert_eq!(n, 0);
}

#[test]
fn read_in_chunks() {
    let device = Device::new().unwrap();
    let mut file = FourFile::open(&device);
    file.write(b"first second").unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let mut buf = [0u8; 6];
    let n = file.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"first ");
    let n = file.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"second");
    assert_eq!(file.read(&mut buf).unwrap(), 0);
}

#[test]
fn seek_from_end_uses_high_water() {
    let device = Device::new().unwrap();
    let mut file = FourFile::open(&device);
    file.write(b"0123456789").unwrap();

    assert_eq!(file.seek(SeekFrom::End(0)).unwrap(), 10);
    assert_eq!(file.seek(SeekFrom::End(-4)).unwrap(), 6);
    assert_eq!(file.seek(SeekFrom::Current(-6)).unwrap(), 0);

    let err = file.seek(SeekFrom::End(1)).expect_err("Past the ceiling");
    assert_eq!(err, ErrorKind::InvalidInput);
    let err = file.seek(SeekFrom::Start(u64::MAX)).expect_err("Too large");
    assert_eq!(err, ErrorKind::InvalidInput);
}

#[test]
fn write_past_capacity_is_truncated_then_rejected() {
    let device = Device::new().unwrap();
    let mut file = FourFile::open(&device);

    let data = vec![b'a'; CAPACITY + 100];
    assert_eq!(file.write(&data).unwrap(), CAPACITY);

    let err = file.write(b"more").expect_err("Cursor is at capacity");
    assert_eq!(err, ErrorKind::InvalidInput);
}

#[test]
fn closed_file_reads_nothing_and_rejects_writes() {
    let device = Device::new().unwrap();
    let mut file = FourFile::open(&device);
    file.close();
    file.close();

    let mut buf = [0u8; 4];
    assert_eq!(file.read(&mut buf).unwrap(), 0);
    assert_eq!(file.write(b"x").unwrap_err(), ErrorKind::InvalidInput);
    assert_eq!(file.hello().unwrap_err(), ErrorKind::InvalidInput);
}

#[test]
fn message_operations() {
    let device = Device::new().unwrap();
    let mut file = FourFile::open(&device);

    file.hello().expect("Should acknowledge");
    file.set_message(&Message::from("Old message\n")).unwrap();
    assert_eq!(file.get_message().unwrap().text(), b"Old message\n");

    let mut msg = Message::from("New message!\n");
    file.exchange_message(&mut msg).unwrap();
    assert_eq!(msg.text(), b"Old message\n");
    assert_eq!(file.get_message().unwrap().text(), b"New message!\n");
}

#[test]
fn unknown_command_is_unsupported() {
    let device = Device::new().unwrap();
    let mut file = FourFile::open(&device);
    let mut arg = [0u8; 60];
    let err = file.ioctl(0x1234, &mut arg).unwrap_err();
    assert_eq!(err, ErrorKind::Unsupported);
}

#[test]
fn torn_down_device_is_not_found() {
    let device = Device::new().unwrap();
    let mut file = FourFile::open(&device);
    device.teardown();

    assert_eq!(file.write(b"x").unwrap_err(), ErrorKind::NotFound);
    assert_eq!(file.get_message().unwrap_err(), ErrorKind::NotFound);
}
