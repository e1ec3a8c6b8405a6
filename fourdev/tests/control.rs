use fourdev::{ControlRequest, ControlResponse, Device, DeviceError, Message, Opcode, MSG_SIZE};

#[test]
fn probe_acknowledges() {
    let device = Device::new().unwrap();
    assert_eq!(
        device.control(ControlRequest::Probe).unwrap(),
        ControlResponse::Ack
    );
}

#[test]
fn set_then_get_then_exchange() {
    let device = Device::new().unwrap();

    let response = device
        .control(ControlRequest::SetMessage("Old message\n".into()))
        .unwrap();
    assert_eq!(response, ControlResponse::Ack);

    let response = device.control(ControlRequest::GetMessage).unwrap();
    assert_eq!(response.message().unwrap().text(), b"Old message\n");

    let response = device
        .control(ControlRequest::ExchangeMessage("New message!\n".into()))
        .unwrap();
    assert_eq!(response.message().unwrap().text(), b"Old message\n");

    let response = device.control(ControlRequest::GetMessage).unwrap();
    assert_eq!(response.message().unwrap().text(), b"New message!\n");
}

#[test]
fn control_does_not_touch_storage() {
    let device = Device::new().unwrap();
    device.write_at(0, b"data").unwrap();

    device
        .control(ControlRequest::SetMessage("status".into()))
        .unwrap();

    assert_eq!(device.high_water().unwrap(), 4);
    assert_eq!(device.logical_len().unwrap(), 4);
}

#[test]
fn message_is_shared_between_handles() {
    let device = Device::new().unwrap();
    let first = device.open();
    let second = device.open();

    first
        .control(ControlRequest::SetMessage("from first".into()))
        .unwrap();
    let response = second.control(ControlRequest::GetMessage).unwrap();
    assert_eq!(response.message().unwrap().text(), b"from first");
}

#[test]
fn ioctl_round_trip_through_argument_buffer() {
    let device = Device::new().unwrap();
    let handle = device.open();

    let mut arg = [0u8; MSG_SIZE];
    handle.ioctl(Opcode::Probe.command(), &mut arg).unwrap();

    let mut arg = *Message::from("Old message\n").as_bytes();
    handle.ioctl(Opcode::SetMessage.command(), &mut arg).unwrap();

    let mut arg = [0xffu8; MSG_SIZE];
    handle.ioctl(Opcode::GetMessage.command(), &mut arg).unwrap();
    assert_eq!(&arg[..13], b"Old message\n\0");

    let mut arg = *Message::from("New message!\n").as_bytes();
    handle
        .ioctl(Opcode::ExchangeMessage.command(), &mut arg)
        .unwrap();
    assert_eq!(&arg[..13], b"Old message\n\0");

    let mut arg = [0u8; MSG_SIZE];
    handle.ioctl(Opcode::GetMessage.command(), &mut arg).unwrap();
    assert_eq!(&arg[..14], b"New message!\n\0");
}

#[test]
fn ioctl_rejects_unknown_commands() {
    let device = Device::new().unwrap();
    let mut arg = [0u8; MSG_SIZE];

    let wrong_number = (u32::from(b'k') << 8) | 9;
    assert_eq!(
        device.ioctl(wrong_number, &mut arg),
        Err(DeviceError::NotSupported(wrong_number))
    );

    let wrong_type = u32::from(b'q') << 8 | 1;
    assert_eq!(
        device.ioctl(wrong_type, &mut arg),
        Err(DeviceError::NotSupported(wrong_type))
    );
}

#[test]
fn ioctl_with_short_argument_is_fault_and_has_no_effect() {
    let device = Device::new().unwrap();
    device
        .control(ControlRequest::SetMessage("before".into()))
        .unwrap();

    let mut short = [b'x'; 8];
    assert_eq!(
        device.ioctl(Opcode::SetMessage.command(), &mut short),
        Err(DeviceError::IoFault)
    );
    assert_eq!(
        device.ioctl(Opcode::ExchangeMessage.command(), &mut short),
        Err(DeviceError::IoFault)
    );

    let response = device.control(ControlRequest::GetMessage).unwrap();
    assert_eq!(response.message().unwrap().text(), b"before");
}

#[test]
fn control_after_teardown_fails() {
    let device = Device::new().unwrap();
    device.teardown();
    assert_eq!(
        device.control(ControlRequest::Probe),
        Err(DeviceError::NoDevice)
    );
}
